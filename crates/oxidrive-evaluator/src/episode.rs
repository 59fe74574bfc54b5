//! Episodes: the synchronous tick loop coupling agents, policies and fitness.
//!
//! An [`Episode`] owns a batch of entrants. Each entrant is one [`Agent`], the [`Policy`]
//! steering it and the [`FitnessSink`] collecting its reward. The episode runs until no
//! agent is left alive.
//!
//! # Tick Protocol
//!
//! Every call to [`Episode::step`] performs one tick:
//!
//! 1. **Decide** - Every live agent's policy sees the agent's latest sensor readings and
//!    answers an action (or a score vector, resolved by argmax). A failing policy leaves
//!    its agent without an action for this tick.
//! 2. **Update** - Every live agent moves, checks for collisions and rescans. An agent that
//!    is still alive afterwards adds its cumulative reward to its fitness.
//! 3. **Count** - The number of agents still alive is reported back.
//!
//! [`Episode::run`] repeats this until all agents have crashed, handing every tick with at
//! least one survivor to an [`EpisodeObserver`]. The tick that kills the last agent is not
//! shown to the observer.
//!
//! Dead agents are never updated again, so their fitness and counters freeze at the moment
//! of the crash.
//!
//! # Generations
//!
//! An episode is one generation. The caller builds a fresh `Episode` (with freshly reset
//! agents and the next population's policies) for every generation, and keeps its own
//! generation counter.

use std::{fmt, ops::ControlFlow, sync::Arc};

use oxidrive_engine::{Agent, Environment, SimulationConfig};
use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// Receives the reward of one agent after every tick it survives.
///
/// The reward handed over is cumulative (total distance so far over half the footprint
/// width), so the total collected by an accumulator grows quadratically with survival time.
pub trait FitnessSink {
    fn add_reward(&mut self, reward: f64);
}

impl FitnessSink for f64 {
    fn add_reward(&mut self, reward: f64) {
        *self += reward;
    }
}

impl<T> FitnessSink for &mut T
where
    T: FitnessSink + ?Sized,
{
    fn add_reward(&mut self, reward: f64) {
        (**self).add_reward(reward);
    }
}

/// Optional bounds on episode length.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeLimits {
    /// Stop after this many ticks even if agents are still alive. `None` runs until every
    /// agent has crashed.
    pub max_ticks: Option<u64>,
}

/// Why an episode stopped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum EpisodeEnd {
    #[display("all agents crashed")]
    AllCrashed,
    #[display("tick limit reached")]
    TickLimit,
    #[display("aborted by observer")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Ticks performed, including the one in which the last agent crashed.
    pub ticks: u64,
    pub end: EpisodeEnd,
    /// Number of (agent, tick) pairs in which the policy failed to produce an action.
    pub policy_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// One-based index of the tick just performed.
    pub tick: u64,
    pub still_alive: usize,
}

/// Read-only view of an episode after a tick, for rendering.
#[derive(Debug, Clone, Copy)]
pub struct TickFrame<'a> {
    pub tick: u64,
    pub still_alive: usize,
    pub environment: &'a Environment,
    /// All agents, dead ones included. Use [`live_agents`](Self::live_agents) for drawing.
    pub agents: &'a [Agent],
}

impl<'a> TickFrame<'a> {
    pub fn live_agents(&self) -> impl Iterator<Item = &'a Agent> + 'a {
        self.agents.iter().filter(|agent| agent.is_alive())
    }
}

/// Render boundary of the tick loop.
///
/// Called once per tick that leaves at least one agent alive. Returning
/// [`ControlFlow::Break`] aborts the episode.
pub trait EpisodeObserver {
    fn on_tick(&mut self, frame: &TickFrame<'_>) -> ControlFlow<()>;
}

impl<F> EpisodeObserver for F
where
    F: FnMut(&TickFrame<'_>) -> ControlFlow<()>,
{
    fn on_tick(&mut self, frame: &TickFrame<'_>) -> ControlFlow<()> {
        self(frame)
    }
}

/// Observer for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EpisodeObserver for NoopObserver {
    fn on_tick(&mut self, _frame: &TickFrame<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// One generation: agents paired 1:1 with policies and fitness accumulators.
pub struct Episode<P, F> {
    environment: Arc<Environment>,
    limits: EpisodeLimits,
    agents: Vec<Agent>,
    policies: Vec<P>,
    fitness: Vec<F>,
    tick: u64,
    still_alive: usize,
    policy_failures: u64,
}

impl<P, F> fmt::Debug for Episode<P, F>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Episode")
            .field("limits", &self.limits)
            .field("entrants", &self.agents.len())
            .field("policies", &self.policies)
            .field("tick", &self.tick)
            .field("still_alive", &self.still_alive)
            .field("policy_failures", &self.policy_failures)
            .finish_non_exhaustive()
    }
}

impl<P, F> Episode<P, F>
where
    P: Policy,
    F: FitnessSink,
{
    /// Creates an episode without entrants.
    #[must_use]
    pub fn new(environment: Arc<Environment>) -> Self {
        Self {
            environment,
            limits: EpisodeLimits::default(),
            agents: vec![],
            policies: vec![],
            fitness: vec![],
            tick: 0,
            still_alive: 0,
            policy_failures: 0,
        }
    }

    /// Creates an episode with one freshly spawned agent per policy, each with a zeroed
    /// fitness accumulator.
    #[must_use]
    pub fn with_population<I>(
        environment: Arc<Environment>,
        config: SimulationConfig,
        policies: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        F: Default,
    {
        let mut episode = Self::new(environment);
        for policy in policies {
            episode.add_entrant(Agent::new(config), policy, F::default());
        }
        episode
    }

    #[must_use]
    pub fn with_limits(mut self, limits: EpisodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Adds an entrant. Dead agents are accepted but never updated.
    pub fn add_entrant(&mut self, agent: Agent, policy: P, fitness: F) {
        if agent.is_alive() {
            self.still_alive += 1;
        }
        self.agents.push(agent);
        self.policies.push(policy);
        self.fitness.push(fitness);
    }

    #[must_use]
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    #[must_use]
    pub fn limits(&self) -> EpisodeLimits {
        self.limits
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn policies(&self) -> &[P] {
        &self.policies
    }

    /// Fitness accumulators, in entrant order.
    #[must_use]
    pub fn fitness(&self) -> &[F] {
        &self.fitness
    }

    #[must_use]
    pub fn into_fitness(self) -> Vec<F> {
        self.fitness
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Ticks performed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn still_alive(&self) -> usize {
        self.still_alive
    }

    /// `true` once no agent is left alive. An episode without entrants is finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.still_alive == 0
    }

    #[must_use]
    pub fn policy_failures(&self) -> u64 {
        self.policy_failures
    }

    #[must_use]
    pub fn frame(&self) -> TickFrame<'_> {
        TickFrame {
            tick: self.tick,
            still_alive: self.still_alive,
            environment: &self.environment,
            agents: &self.agents,
        }
    }

    /// Performs one tick. Does nothing once the episode is finished.
    pub fn step(&mut self) -> TickReport {
        if self.is_finished() {
            return TickReport {
                tick: self.tick,
                still_alive: 0,
            };
        }
        self.tick += 1;
        let tick = self.tick;

        for (index, (agent, policy)) in self.agents.iter_mut().zip(&mut self.policies).enumerate()
        {
            if !agent.is_alive() {
                continue;
            }
            let readings = agent.sensor_readings();
            match policy
                .evaluate(&readings)
                .and_then(|output| output.resolve())
            {
                Ok(action) => agent.apply_action(action),
                Err(error) => {
                    self.policy_failures += 1;
                    tracing::warn!(agent = index, tick, %error, "policy produced no action");
                }
            }
        }

        let mut still_alive = 0;
        for (index, (agent, fitness)) in self.agents.iter_mut().zip(&mut self.fitness).enumerate()
        {
            if !agent.is_alive() {
                continue;
            }
            agent.update(&self.environment);
            if agent.is_alive() {
                fitness.add_reward(agent.reward());
                still_alive += 1;
            } else {
                tracing::debug!(
                    agent = index,
                    tick,
                    distance = agent.distance_traveled(),
                    "agent crashed"
                );
            }
        }
        self.still_alive = still_alive;

        TickReport { tick, still_alive }
    }

    /// Steps until every agent has crashed, the tick limit is hit or the observer aborts.
    pub fn run<O>(&mut self, observer: &mut O) -> EpisodeOutcome
    where
        O: EpisodeObserver + ?Sized,
    {
        let end = loop {
            if self.is_finished() {
                break EpisodeEnd::AllCrashed;
            }
            if self.limits.max_ticks.is_some_and(|max| self.tick >= max) {
                break EpisodeEnd::TickLimit;
            }
            let report = self.step();
            if report.still_alive == 0 {
                break EpisodeEnd::AllCrashed;
            }
            if observer.on_tick(&self.frame()).is_break() {
                break EpisodeEnd::Aborted;
            }
        };

        let outcome = EpisodeOutcome {
            ticks: self.tick,
            end,
            policy_failures: self.policy_failures,
        };
        tracing::info!(
            ticks = outcome.ticks,
            agents = self.agents.len(),
            still_alive = self.still_alive,
            policy_failures = outcome.policy_failures,
            "episode ended: {end}"
        );
        outcome
    }
}
