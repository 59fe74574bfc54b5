//! Simulation engine for oxidrive: environments, agents and their sensors.
//!
//! This crate holds everything that happens *inside* one simulation tick:
//!
//! - [`Environment`] - Immutable passable/impassable field the agents drive on
//! - [`Agent`] - Kinematic state, footprint corners, collision and liveness
//! - [`SensorArray`] - Ray-marched distance sensing against the environment
//! - [`SimulationConfig`] - Footprint, speed and sensor constants
//!
//! Driving several agents through a whole episode, asking policies for actions and
//! accumulating fitness lives in the `oxidrive-evaluator` crate.
//!
//! # Example
//!
//! ```
//! use oxidrive_engine::{Action, Agent, Environment, SimulationConfig};
//!
//! let environment = Environment::passable(1600, 900).unwrap();
//! let mut agent = Agent::new(SimulationConfig::default());
//!
//! agent.apply_action(Action::TurnLeft);
//! agent.update(&environment);
//!
//! assert!(agent.is_alive());
//! assert_eq!(agent.angle(), 10.0);
//! ```

pub use self::{agent::*, config::*, core::*};

pub mod agent;
pub mod config;
pub mod core;

/// Errors raised while building an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EnvironmentError {
    #[display("environment must not be empty (got {width}x{height})")]
    Empty { width: usize, height: usize },
    #[display("row {row} has width {actual}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
