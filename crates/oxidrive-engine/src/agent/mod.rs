//! Simulated vehicles.
//!
//! An [`Agent`] is a square footprint moving through an [`Environment`]. Once per tick
//! the episode driver applies at most one [`Action`] and then calls [`Agent::update`],
//! which moves the agent, checks its corners for collisions and recasts its sensors.
//!
//! # Update Order
//!
//! [`Agent::update`] performs these steps, in this order:
//!
//! 1. Assign the initial speed if this is the first update
//! 2. Advance `x` along the heading, clamp it to the horizontal bounds
//! 3. Add the speed to the traveled distance and count the tick
//! 4. Advance `y` along the heading, clamp it to the vertical bounds
//! 5. Recompute the center and the four footprint corners
//! 6. Check the corners for collisions
//! 7. Recast all sensor rays
//!
//! Distance and tick counters advance before the collision check, so the tick in which an
//! agent crashes still counts.
//!
//! # Bounds
//!
//! The position (top-left corner of the footprint) stays within
//! `[margin_min, width - margin_max] × [margin_min, height - margin_max]` of the
//! environment. Both axes use their own environment dimension.

use serde::{Deserialize, Serialize};

use crate::{
    AgentConfig, CORNER_OFFSETS, Environment, SimulationConfig, Vec2, heading_vector,
};

pub use self::sensor::*;

mod sensor;

/// Discrete control input, in policy output order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Rotate the heading counter-clockwise by `turn_step` degrees.
    TurnLeft,
    /// Rotate the heading clockwise by `turn_step` degrees.
    TurnRight,
    /// Decrease the speed by `speed_step`, unless that would go below `min_speed`.
    SlowDown,
    /// Increase the speed by `speed_step`.
    SpeedUp,
}

impl Action {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] = [
        Self::TurnLeft,
        Self::TurnRight,
        Self::SlowDown,
        Self::SpeedUp,
    ];

    /// Position of this action in score vectors.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A single simulated vehicle.
#[derive(Debug, Clone)]
pub struct Agent {
    config: SimulationConfig,
    position: Vec2,
    angle: f64,
    speed: f64,
    speed_initialized: bool,
    center: Vec2,
    corners: [Vec2; 4],
    sensors: SensorArray,
    alive: bool,
    distance_traveled: f64,
    ticks_survived: u64,
}

impl Agent {
    /// Creates an agent at the configured spawn pose.
    ///
    /// The speed stays at zero until the first [`update`](Self::update).
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let AgentConfig {
            start_position,
            start_angle,
            ..
        } = config.agent;
        let center = center_of(start_position, &config.agent);
        Self {
            config,
            position: start_position,
            angle: start_angle,
            speed: 0.0,
            speed_initialized: false,
            center,
            corners: corners_around(center, start_angle, &config.agent),
            sensors: SensorArray::new(),
            alive: true,
            distance_traveled: 0.0,
            ticks_survived: 0,
        }
    }

    /// Creates an agent at an explicit pose instead of the configured spawn pose.
    #[must_use]
    pub fn with_pose(mut config: SimulationConfig, position: Vec2, angle: f64) -> Self {
        config.agent.start_position = position;
        config.agent.start_angle = angle;
        Self::new(config)
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Top-left reference point of the footprint.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Heading in degrees (see [`heading_vector`]). Never wrapped.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Footprint corners, in [`CORNER_OFFSETS`] order.
    #[must_use]
    pub fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }

    #[must_use]
    pub fn sensors(&self) -> &SensorArray {
        &self.sensors
    }

    /// Scaled sensor readings from the latest update; what policies get to see.
    #[must_use]
    pub fn sensor_readings(&self) -> SensorReadings {
        self.sensors.readings()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }

    #[must_use]
    pub fn ticks_survived(&self) -> u64 {
        self.ticks_survived
    }

    /// Reward for the distance traveled so far: `distance_traveled / (width / 2)`.
    ///
    /// This is cumulative, not a per-tick delta.
    #[must_use]
    pub fn reward(&self) -> f64 {
        self.distance_traveled / self.config.agent.reward_unit()
    }

    /// Applies a control input. Takes effect on the next [`update`](Self::update).
    pub fn apply_action(&mut self, action: Action) {
        let AgentConfig {
            turn_step,
            speed_step,
            min_speed,
            ..
        } = self.config.agent;
        match action {
            Action::TurnLeft => self.angle += turn_step,
            Action::TurnRight => self.angle -= turn_step,
            Action::SlowDown => {
                if self.speed - speed_step >= min_speed {
                    self.speed -= speed_step;
                }
            }
            Action::SpeedUp => self.speed += speed_step,
        }
    }

    /// Advances the agent by one tick. See the [module documentation](self) for the steps.
    ///
    /// Callers must stop updating an agent once it is dead: the collision check re-arms
    /// `alive` before testing the corners.
    #[expect(clippy::cast_precision_loss)]
    pub fn update(&mut self, environment: &Environment) {
        let agent = self.config.agent;
        if !self.speed_initialized {
            self.speed = agent.initial_speed;
            self.speed_initialized = true;
        }

        let dir = heading_vector(self.angle);
        let x_max = environment.width() as f64 - agent.margin_max;
        let y_max = environment.height() as f64 - agent.margin_max;

        self.position.x = clamp_axis(
            self.position.x + dir.x * self.speed,
            agent.margin_min,
            x_max,
        );

        self.distance_traveled += self.speed;
        self.ticks_survived += 1;

        self.position.y = clamp_axis(
            self.position.y + dir.y * self.speed,
            agent.margin_min,
            y_max,
        );

        self.center = center_of(self.position, &agent);
        self.corners = corners_around(self.center, self.angle, &agent);

        self.check_collision(environment);
        self.sensors
            .scan(self.center, self.angle, environment, &self.config.sensor);
    }

    /// Marks the agent alive, then dead if any corner is on an impassable point.
    pub fn check_collision(&mut self, environment: &Environment) {
        self.alive = true;
        for corner in &self.corners {
            let point = corner.to_point();
            if environment.is_impassable(point.x, point.y) {
                self.alive = false;
                break;
            }
        }
    }
}

/// Clamps without panicking when the environment is smaller than the margins.
fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn center_of(position: Vec2, agent: &AgentConfig) -> Vec2 {
    Vec2::new(
        position.x.trunc() + agent.width / 2.0,
        position.y.trunc() + agent.height / 2.0,
    )
}

fn corners_around(center: Vec2, angle: f64, agent: &AgentConfig) -> [Vec2; 4] {
    let radius = agent.corner_radius();
    CORNER_OFFSETS.map(|offset| center.offset(angle + offset, radius))
}

#[cfg(test)]
mod tests {
    use crate::Point;

    use super::*;

    fn open_field() -> Environment {
        Environment::passable(1600, 900).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_new_agent_state() {
        let agent = Agent::new(SimulationConfig::default());
        assert_eq!(agent.position(), Vec2::new(800.0, 800.0));
        assert_eq!(agent.center(), Vec2::new(840.0, 840.0));
        assert_eq!(agent.angle(), 0.0);
        assert_eq!(agent.speed(), 0.0);
        assert!(agent.is_alive());
        assert_eq!(agent.distance_traveled(), 0.0);
        assert_eq!(agent.ticks_survived(), 0);
        assert_eq!(agent.sensor_readings(), SensorReadings::default());
    }

    #[test]
    fn test_update_on_passable_ground_stays_alive() {
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&open_field());
        assert!(agent.is_alive());
        assert_eq!(agent.position().x, 820.0);
        // spawn y = 800 is past the bound height - margin_max, so the first update snaps it up
        assert_eq!(agent.position().y, 780.0);
        assert_eq!(agent.center(), Vec2::new(860.0, 820.0));
        assert_eq!(agent.sensors().hits().len(), SENSOR_COUNT);
    }

    #[test]
    fn test_speed_is_initialized_once_on_first_update() {
        let mut agent = Agent::new(SimulationConfig::default());
        agent.apply_action(Action::SpeedUp);
        assert_eq!(agent.speed(), 2.0);
        agent.update(&open_field());
        assert_eq!(agent.speed(), 20.0);

        agent.apply_action(Action::SpeedUp);
        agent.update(&open_field());
        assert_eq!(agent.speed(), 22.0);
    }

    #[test]
    fn test_slow_down_never_goes_below_floor() {
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&open_field());
        for _ in 0..10 {
            agent.apply_action(Action::SlowDown);
            assert!(agent.speed() >= 12.0);
        }
        assert_eq!(agent.speed(), 12.0);

        // before the first update the speed is zero and slowing down is a no-op
        let mut fresh = Agent::new(SimulationConfig::default());
        fresh.apply_action(Action::SlowDown);
        assert_eq!(fresh.speed(), 0.0);
    }

    #[test]
    fn test_nine_left_turns_add_ninety_degrees() {
        let mut agent = Agent::new(SimulationConfig::default());
        for _ in 0..9 {
            agent.apply_action(Action::TurnLeft);
        }
        assert_eq!(agent.angle(), 90.0);
        agent.apply_action(Action::TurnRight);
        assert_eq!(agent.angle(), 80.0);
    }

    #[test]
    fn test_left_turn_moves_toward_screen_top() {
        let config = SimulationConfig::default();
        let mut agent = Agent::with_pose(config, Vec2::new(400.0, 400.0), 90.0);
        agent.update(&open_field());
        assert_close(agent.position().x, 400.0);
        assert_close(agent.position().y, 380.0);
    }

    #[test]
    fn test_forward_sensor_sees_point_fifty_ahead() {
        // first update moves the center to (860, 820)
        let env = Environment::from_fn(1600, 900, |x, y| (x, y) == (910, 820)).unwrap();
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&env);
        assert!(agent.is_alive());
        assert_eq!(agent.sensors().hits()[2].hit_point, Point::new(910, 820));
        assert_eq!(agent.sensor_readings()[2], 1);
    }

    #[test]
    fn test_crash_still_counts_the_tick() {
        let env = Environment::from_fn(1600, 900, |_, _| true).unwrap();
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&env);
        assert!(!agent.is_alive());
        assert_eq!(agent.ticks_survived(), 1);
        assert_eq!(agent.distance_traveled(), 20.0);
        assert_eq!(agent.sensor_readings(), SensorReadings::default());
    }

    #[test]
    fn test_single_impassable_corner_kills() {
        // front-left corner of the footprint after the first update
        let front_left = Vec2::new(860.0, 820.0).offset(30.0, 40.0).to_point();
        let env = Environment::from_fn(1600, 900, |x, y| {
            i64::try_from(x).unwrap() == front_left.x && i64::try_from(y).unwrap() == front_left.y
        })
        .unwrap();
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&env);
        assert_eq!(agent.corners()[0].to_point(), front_left);
        assert!(!agent.is_alive());
    }

    #[test]
    fn test_corners_surround_center() {
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&open_field());
        let center = agent.center();
        let [front_left, rear_left, rear_right, front_right] = *agent.corners();
        assert_close(front_left.x, center.x + 40.0 * 30_f64.to_radians().cos());
        assert_close(front_left.y, center.y - 20.0);
        assert_close(rear_left.x, center.x - 40.0 * 30_f64.to_radians().cos());
        assert_close(rear_left.y, center.y - 20.0);
        assert_close(rear_right.y, center.y + 20.0);
        assert_close(front_right.y, center.y + 20.0);
        assert!(front_right.x > center.x);
    }

    #[test]
    fn test_collision_check_rearms_alive() {
        let mut agent = Agent::new(SimulationConfig::default());
        agent.update(&Environment::from_fn(1600, 900, |_, _| true).unwrap());
        assert!(!agent.is_alive());
        agent.check_collision(&open_field());
        assert!(agent.is_alive());
    }

    #[test]
    fn test_position_is_clamped_on_both_axes() {
        let config = SimulationConfig::default();
        let env = open_field();

        let mut left = Agent::with_pose(config, Vec2::new(25.0, 400.0), 180.0);
        left.update(&env);
        assert_eq!(left.position().x, 20.0);

        let mut right = Agent::with_pose(config, Vec2::new(1470.0, 400.0), 0.0);
        right.update(&env);
        assert_eq!(right.position().x, 1480.0);

        let mut up = Agent::with_pose(config, Vec2::new(400.0, 30.0), 90.0);
        up.update(&env);
        assert_eq!(up.position().y, 20.0);
    }

    #[test]
    fn test_reward_is_cumulative_distance_over_half_width() {
        let mut agent = Agent::new(SimulationConfig::default());
        let env = open_field();
        for _ in 0..3 {
            agent.update(&env);
        }
        assert_eq!(agent.distance_traveled(), 60.0);
        assert_eq!(agent.reward(), 1.5);
    }

    #[test]
    fn test_action_indices_follow_policy_order() {
        for (i, action) in Action::ALL.into_iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
        assert_eq!(Action::SlowDown.to_string(), "SlowDown");
    }
}
