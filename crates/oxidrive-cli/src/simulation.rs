//! Setup shared by the `run` and `view` commands: track, config and population.

use std::{path::PathBuf, sync::Arc};

use oxidrive_engine::{Action, Agent, Environment, OvalTrack, SimulationConfig};
use oxidrive_evaluator::{
    episode::{Episode, EpisodeLimits},
    policy::{ConstantPolicy, Policy, RandomPolicy, WallFollowerPolicy},
    report::Generation,
};
use serde::Serialize;

use crate::{
    track::{BorderColor, TrackSource},
    util,
};

/// Built-in stand-ins for evolved policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Turn toward open space, brake when the road ahead is short
    WallFollower,
    /// Uniformly random actions
    Random,
    /// Keep the heading and brake down to the minimum speed
    Straight,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SimulationArg {
    /// Track image (PNG); the built-in oval track is used when omitted
    #[arg(long)]
    track: Option<PathBuf>,
    /// Pixel color marking impassable points, as `r,g,b,a`
    #[arg(long, default_value_t = BorderColor::default())]
    border_color: BorderColor,
    /// Simulation config override (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Policy driving every agent
    #[arg(long, value_enum, default_value_t = PolicyKind::WallFollower)]
    policy: PolicyKind,
    /// Agents per generation
    #[arg(long, default_value_t = 20)]
    population: usize,
    /// Seed for random policies; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl SimulationArg {
    pub fn load(&self) -> anyhow::Result<Simulation> {
        let source = match &self.track {
            Some(path) => TrackSource::Image {
                path,
                border_color: self.border_color,
            },
            None => TrackSource::Oval(OvalTrack::default()),
        };
        let environment = source.load()?;
        let config = util::read_config_file(self.config.as_deref())?;

        let spawn = Agent::new(config);
        if spawn
            .corners()
            .iter()
            .map(|corner| corner.to_point())
            .any(|p| environment.is_impassable(p.x, p.y))
        {
            tracing::warn!(
                position = ?config.agent.start_position,
                "spawn footprint overlaps the track border; agents will crash on the first tick"
            );
        }

        Ok(Simulation {
            environment: Arc::new(environment),
            config,
            track: source.name(),
            policy: self.policy,
            population: self.population,
            seed: self.seed.unwrap_or_else(rand::random),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub environment: Arc<Environment>,
    pub config: SimulationConfig,
    /// Track name for reports.
    pub track: String,
    pub policy: PolicyKind,
    pub population: usize,
    pub seed: u64,
}

impl Simulation {
    /// Builds the policies of one generation.
    ///
    /// Wall followers get clearances 1 to 6 in turn; random policies get a distinct seed
    /// per generation and agent.
    pub fn policies(&self, generation: Generation) -> Vec<Box<dyn Policy>> {
        (0..self.population)
            .map(|i| -> Box<dyn Policy> {
                match self.policy {
                    PolicyKind::WallFollower => Box::new(WallFollowerPolicy {
                        clearance: clearance_for(i),
                    }),
                    PolicyKind::Random => {
                        let offset = generation
                            .0
                            .wrapping_mul(self.population as u64)
                            .wrapping_add(i as u64);
                        Box::new(RandomPolicy::new(self.seed.wrapping_add(offset)))
                    }
                    PolicyKind::Straight => Box::new(ConstantPolicy(Action::SlowDown)),
                }
            })
            .collect()
    }

    pub fn episode(
        &self,
        generation: Generation,
        limits: EpisodeLimits,
    ) -> Episode<Box<dyn Policy>, f64> {
        Episode::with_population(
            Arc::clone(&self.environment),
            self.config,
            self.policies(generation),
        )
        .with_limits(limits)
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn clearance_for(index: usize) -> i32 {
    (index % 6) as i32 + 1
}
