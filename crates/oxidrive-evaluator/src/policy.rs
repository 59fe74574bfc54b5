//! Policies: the decision makers steering agents.
//!
//! A [`Policy`] receives the scaled sensor readings of one agent each tick and answers
//! with a [`PolicyOutput`]: either an [`Action`] or one score per action. Score vectors
//! are resolved with [`select_action`]: the strictly greatest score wins and the first
//! index wins ties, in [`Action::ALL`] order.
//!
//! Policies are black boxes to the episode. Whatever produces them (an evolved network,
//! a script, a human) lives outside this crate; the built-in policies below are simple
//! stand-ins used by the command line tools and tests.
//!
//! # Failures
//!
//! A policy may fail by returning [`PolicyError`], or by producing a score vector that
//! cannot be resolved (wrong length, non-finite values). The episode treats either case
//! as "no action this tick" for that agent and keeps going.
//!
//! # Built-in Policies
//!
//! - [`ConstantPolicy`] - Always the same action
//! - [`ScriptedPolicy`] - A fixed sequence of actions
//! - [`WallFollowerPolicy`] - Steers toward open space using the side sensors
//! - [`RandomPolicy`] - Uniformly random actions from a seeded generator
//! - [`FnPolicy`] - Any closure over the readings

use std::fmt;

use oxidrive_engine::{Action, SensorReadings};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

/// Errors raised while asking a policy for an action.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum PolicyError {
    #[display("expected {expected} scores, got {actual}")]
    ScoreCount { expected: usize, actual: usize },
    #[display("score {index} is not finite")]
    NonFiniteScore { index: usize },
    #[display("policy failed: {message}")]
    Failed { message: String },
}

/// What a policy answers for one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutput {
    Action(Action),
    /// One score per action, in [`Action::ALL`] order.
    Scores(Vec<f64>),
}

impl PolicyOutput {
    /// Resolves the output to a single action.
    pub fn resolve(&self) -> Result<Action, PolicyError> {
        match self {
            Self::Action(action) => Ok(*action),
            Self::Scores(scores) => select_action(scores),
        }
    }
}

impl From<Action> for PolicyOutput {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

/// Picks the action with the strictly greatest score; the first index wins ties.
///
/// # Examples
///
/// ```
/// use oxidrive_engine::Action;
/// use oxidrive_evaluator::policy::select_action;
///
/// assert_eq!(select_action(&[0.1, 0.7, 0.2, 0.7]).unwrap(), Action::TurnRight);
/// assert_eq!(select_action(&[0.0; 4]).unwrap(), Action::TurnLeft);
/// assert!(select_action(&[1.0, 2.0]).is_err());
/// ```
pub fn select_action(scores: &[f64]) -> Result<Action, PolicyError> {
    if scores.len() != Action::COUNT {
        return Err(PolicyError::ScoreCount {
            expected: Action::COUNT,
            actual: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(PolicyError::NonFiniteScore { index });
    }

    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }
    Ok(Action::ALL[best])
}

/// Maps the sensor readings of one agent to an action, once per tick.
pub trait Policy: fmt::Debug {
    fn evaluate(&mut self, readings: &SensorReadings) -> Result<PolicyOutput, PolicyError>;
}

impl<P> Policy for Box<P>
where
    P: Policy + ?Sized,
{
    fn evaluate(&mut self, readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        (**self).evaluate(readings)
    }
}

impl<P> Policy for &mut P
where
    P: Policy + ?Sized,
{
    fn evaluate(&mut self, readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        (**self).evaluate(readings)
    }
}

/// Always answers the same action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantPolicy(pub Action);

impl Policy for ConstantPolicy {
    fn evaluate(&mut self, _readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        Ok(self.0.into())
    }
}

/// Replays a fixed list of actions, then keeps answering `then`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    cursor: usize,
    then: Option<Action>,
}

impl ScriptedPolicy {
    /// Once the script is exhausted the policy fails every tick.
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            cursor: 0,
            then: None,
        }
    }

    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.then = Some(action);
        self
    }
}

impl Policy for ScriptedPolicy {
    fn evaluate(&mut self, _readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        let action = match self.actions.get(self.cursor) {
            Some(action) => {
                self.cursor += 1;
                *action
            }
            None => self.then.ok_or_else(|| PolicyError::Failed {
                message: "script exhausted".to_owned(),
            })?,
        };
        Ok(action.into())
    }
}

/// Heuristic driver: turn toward the more open side, brake when the road ahead is short.
///
/// Reads the default sensor layout (`-90, -45, 0, 45, 90`): indices 0 and 1 look right,
/// 3 and 4 look left, 2 looks straight ahead. Scores:
///
/// ```text
/// turn_left  = (left - right) - 1
/// turn_right = (right - left) - 1
/// slow_down  = clearance - ahead
/// speed_up   = ahead - 2 × clearance
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallFollowerPolicy {
    /// Forward reading below which the policy starts braking.
    pub clearance: i32,
}

impl Default for WallFollowerPolicy {
    fn default() -> Self {
        Self { clearance: 4 }
    }
}

impl Policy for WallFollowerPolicy {
    fn evaluate(&mut self, readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        let [right, front_right, ahead, front_left, left] = *readings.as_array();
        let side_balance = f64::from((front_left + left) - (right + front_right));
        let ahead = f64::from(ahead);
        let clearance = f64::from(self.clearance);
        Ok(PolicyOutput::Scores(vec![
            side_balance - 1.0,
            -side_balance - 1.0,
            clearance - ahead,
            ahead - 2.0 * clearance,
        ]))
    }
}

/// Uniformly random actions from a seeded generator.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: Pcg64Mcg,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn evaluate(&mut self, _readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        let index = self.rng.random_range(0..Action::COUNT);
        Ok(Action::ALL[index].into())
    }
}

/// Adapts a closure into a [`Policy`].
pub struct FnPolicy<F>(pub F);

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnPolicy").finish_non_exhaustive()
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: FnMut(&SensorReadings) -> Result<PolicyOutput, PolicyError>,
{
    fn evaluate(&mut self, readings: &SensorReadings) -> Result<PolicyOutput, PolicyError> {
        (self.0)(readings)
    }
}
