//! Episode evaluation: running a population of agents and scoring them.
//!
//! This crate couples agents from `oxidrive-engine` to the decision makers that steer
//! them and turns their survival into fitness:
//!
//! 1. **Policies** ([`policy`]) - Map the five sensor readings of an agent to an
//!    [`Action`](oxidrive_engine::Action), either directly or through a score vector.
//!
//! 2. **Episodes** ([`episode`]) - Step every live agent once per tick until all of them
//!    have crashed, adding each survivor's reward to its fitness accumulator.
//!
//! 3. **Reports** ([`report`]) - Summarize finished episodes for the caller that evolves
//!    the next population.
//!
//! # Architecture
//!
//! ```text
//! Evolutionary runtime (caller)
//!     ↓ supplies policies + fitness accumulators, owns the generation counter
//! Episode (tick loop)
//!     ↓ asks
//! Policy (sensor readings → action)
//!     ↓ steers
//! Agent (oxidrive-engine)
//! ```
//!
//! The crate knows nothing about how policies are built or evolved: a policy is anything
//! implementing [`Policy`](policy::Policy), and fitness is anything implementing
//! [`FitnessSink`](episode::FitnessSink).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use oxidrive_engine::{Action, OvalTrack, SimulationConfig};
//! use oxidrive_evaluator::{
//!     episode::{Episode, EpisodeEnd, NoopObserver},
//!     policy::ConstantPolicy,
//! };
//!
//! let environment = Arc::new(OvalTrack::default().to_environment().unwrap());
//! let policies = [ConstantPolicy(Action::TurnLeft), ConstantPolicy(Action::SpeedUp)];
//! let mut episode: Episode<_, f64> =
//!     Episode::with_population(environment, SimulationConfig::default(), policies);
//!
//! let outcome = episode.run(&mut NoopObserver);
//! assert_eq!(outcome.end, EpisodeEnd::AllCrashed);
//! assert!(episode.fitness().iter().all(|f| *f >= 0.0));
//! ```

pub mod episode;
pub mod policy;
pub mod report;
