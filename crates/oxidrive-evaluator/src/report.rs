//! Episode summaries handed back to the caller driving evolution.
//!
//! After an episode ends the caller usually wants three things: the fitness of every
//! entrant (to select parents), a few aggregate numbers (to track progress across
//! generations) and enough detail to inspect individual agents. [`EpisodeReport`] bundles
//! all three and serializes to JSON.

use oxidrive_engine::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    episode::{Episode, EpisodeEnd, EpisodeOutcome},
    policy::Policy,
};

/// Generation counter, owned by whoever drives the sequence of episodes.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation a fresh run starts from.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Descriptive statistics over the fitness of one population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper median for even counts.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl FitnessStats {
    /// Computes statistics from unsorted values. Returns `None` for an empty input.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxidrive_evaluator::report::FitnessStats;
    ///
    /// let stats = FitnessStats::new([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert!(FitnessStats::new([]).is_none());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Final state of one entrant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub alive: bool,
    pub ticks_survived: u64,
    pub distance_traveled: f64,
    pub fitness: f64,
    pub position: Vec2,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub generation: Generation,
    pub ticks: u64,
    pub end: EpisodeEnd,
    pub policy_failures: u64,
    /// Fitness per entrant, in entrant order.
    pub fitness: Vec<f64>,
    /// `None` for an episode without entrants.
    pub stats: Option<FitnessStats>,
    pub agents: Vec<AgentSummary>,
}

impl EpisodeReport {
    #[must_use]
    pub fn from_episode<P>(
        generation: Generation,
        outcome: &EpisodeOutcome,
        episode: &Episode<P, f64>,
    ) -> Self
    where
        P: Policy,
    {
        let fitness = episode.fitness().to_vec();
        let agents = episode
            .agents()
            .iter()
            .zip(&fitness)
            .map(|(agent, fitness)| AgentSummary {
                alive: agent.is_alive(),
                ticks_survived: agent.ticks_survived(),
                distance_traveled: agent.distance_traveled(),
                fitness: *fitness,
                position: agent.position(),
                angle: agent.angle(),
            })
            .collect();
        Self {
            generation,
            ticks: outcome.ticks,
            end: outcome.end,
            policy_failures: outcome.policy_failures,
            stats: FitnessStats::new(fitness.iter().copied()),
            fitness,
            agents,
        }
    }

    /// Index of the fittest entrant; the first one wins ties.
    #[must_use]
    pub fn best_agent(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, fitness) in self.fitness.iter().enumerate() {
            if best.is_none_or(|b| *fitness > self.fitness[b]) {
                best = Some(i);
            }
        }
        best
    }
}
