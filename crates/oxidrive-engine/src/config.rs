//! Simulation constants.
//!
//! Every number that shapes agent behavior lives here so that a whole run can be described
//! by one serializable [`SimulationConfig`]. Defaults reproduce the reference track setup:
//! an 80×80 vehicle spawning at `(800, 800)` facing 0°, five sensors spread over ±90°.
//!
//! All structs use `#[serde(default)]`, so a partial JSON document only overrides the
//! fields it names:
//!
//! ```
//! use oxidrive_engine::SimulationConfig;
//!
//! let config: SimulationConfig =
//!     serde_json::from_str(r#"{ "agent": { "initial_speed": 25.0 } }"#).unwrap();
//! assert_eq!(config.agent.initial_speed, 25.0);
//! assert_eq!(config.agent.min_speed, 12.0);
//! assert_eq!(config.sensor.max_range, 300);
//! ```

use serde::{Deserialize, Serialize};

use crate::{SENSOR_COUNT, Vec2};

/// Corner directions relative to the heading, in degrees.
///
/// The footprint corners sit on a circle around the center; these offsets put them at
/// front-left, rear-left, rear-right and front-right.
pub const CORNER_OFFSETS: [f64; 4] = [30.0, 150.0, 210.0, 330.0];

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent: AgentConfig,
    pub sensor: SensorConfig,
}

/// Footprint, spawn pose and speed rules of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Footprint width; also sets the corner radius and the reward divisor.
    pub width: f64,
    pub height: f64,
    /// Top-left reference point at spawn.
    pub start_position: Vec2,
    /// Heading at spawn, in degrees.
    pub start_angle: f64,
    /// Speed assigned on the first update.
    pub initial_speed: f64,
    /// `SlowDown` never takes the speed below this value.
    pub min_speed: f64,
    /// Speed change per `SlowDown`/`SpeedUp`.
    pub speed_step: f64,
    /// Heading change per `TurnLeft`/`TurnRight`, in degrees.
    pub turn_step: f64,
    /// Lowest allowed position on both axes.
    pub margin_min: f64,
    /// Distance kept between the position and the far edge of the environment.
    pub margin_max: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            width: 80.0,
            height: 80.0,
            start_position: Vec2::new(800.0, 800.0),
            start_angle: 0.0,
            initial_speed: 20.0,
            min_speed: 12.0,
            speed_step: 2.0,
            turn_step: 10.0,
            margin_min: 20.0,
            margin_max: 120.0,
        }
    }
}

impl AgentConfig {
    /// Distance from the center to each footprint corner (`width / 2`, rounded down).
    #[must_use]
    pub fn corner_radius(&self) -> f64 {
        (self.width / 2.0).floor()
    }

    /// Divisor turning traveled distance into reward (`width / 2`).
    #[must_use]
    pub fn reward_unit(&self) -> f64 {
        self.width / 2.0
    }
}

/// Ray-marching sensor layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Ray directions relative to the heading, in degrees, in reading order.
    pub offsets: [f64; SENSOR_COUNT],
    /// Longest distance a ray marches before giving up.
    pub max_range: u32,
    /// Raw distances are divided (rounding down) by this value before policies see them.
    pub reading_scale: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            offsets: [-90.0, -45.0, 0.0, 45.0, 90.0],
            max_range: 300,
            reading_scale: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_derived_values() {
        let agent = AgentConfig::default();
        assert_eq!(agent.corner_radius(), 40.0);
        assert_eq!(agent.reward_unit(), 40.0);

        let odd = AgentConfig {
            width: 5.0,
            ..AgentConfig::default()
        };
        assert_eq!(odd.corner_radius(), 2.0);
        assert_eq!(odd.reward_unit(), 2.5);
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_serialize_roundtrip_keeps_overrides() {
        let mut config = SimulationConfig::default();
        config.sensor.offsets = [-60.0, -30.0, 0.0, 30.0, 60.0];
        config.agent.start_position = Vec2::new(10.0, 20.0);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_wrong_sensor_count_is_rejected() {
        let result: Result<SimulationConfig, _> =
            serde_json::from_str(r#"{ "sensor": { "offsets": [0.0, 90.0] } }"#);
        assert!(result.is_err());
    }
}
