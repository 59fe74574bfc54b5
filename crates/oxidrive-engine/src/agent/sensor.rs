use std::ops::Index;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{Environment, Point, SensorConfig, Vec2};

/// Number of distance sensors on every agent.
pub const SENSOR_COUNT: usize = 5;

/// Result of marching a single ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarHit {
    /// Last sampled point: the first impassable point, or the point at maximum range.
    pub hit_point: Point,
    /// Euclidean distance from the ray origin to `hit_point`, rounded down.
    pub distance: u32,
}

/// Marches a ray from `origin` along `heading` until it meets an impassable point.
///
/// The ray samples `trunc(origin + length · dir)` for `length = 0, 1, 2, …` and stops at
/// the first impassable sample or once `length` reaches `max_range`, whichever comes
/// first. Leaving the environment counts as hitting an impassable point.
///
/// # Examples
///
/// ```
/// use oxidrive_engine::{Environment, Point, Vec2, cast_ray};
///
/// let env = Environment::from_fn(100, 700, |x, _| x >= 60).unwrap();
/// let hit = cast_ray(Vec2::new(10.0, 600.0), 0.0, &env, 300);
/// assert_eq!(hit.hit_point, Point::new(60, 600));
/// assert_eq!(hit.distance, 50);
/// ```
#[must_use]
pub fn cast_ray(
    origin: Vec2,
    heading: f64,
    environment: &Environment,
    max_range: u32,
) -> RadarHit {
    let mut length = 0;
    let mut point = origin.to_point();
    while !environment.is_impassable(point.x, point.y) && length < max_range {
        length += 1;
        point = origin.offset(heading, f64::from(length)).to_point();
    }
    RadarHit {
        hit_point: point,
        distance: distance_between(origin, point),
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn distance_between(origin: Vec2, point: Point) -> u32 {
    let target = point.to_vec2();
    (target.x - origin.x).hypot(target.y - origin.y) as u32
}

/// Scaled sensor distances, in sensor order.
///
/// Consumers index readings positionally; index `i` always belongs to the `i`-th entry of
/// [`SensorConfig::offsets`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorReadings([i32; SENSOR_COUNT]);

impl SensorReadings {
    #[must_use]
    pub const fn new(values: [i32; SENSOR_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[i32; SENSOR_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl Index<usize> for SensorReadings {
    type Output = i32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// The five distance sensors of an agent.
///
/// Each tick the array is cleared and every ray is cast again from scratch; nothing is
/// carried over between ticks.
#[derive(Debug, Default, Clone)]
pub struct SensorArray {
    hits: ArrayVec<RadarHit, SENSOR_COUNT>,
    readings: SensorReadings,
}

impl SensorArray {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw hits of the latest scan, in sensor order. Empty before the first scan.
    #[must_use]
    pub fn hits(&self) -> &[RadarHit] {
        &self.hits
    }

    /// Scaled readings of the latest scan. All zeros before the first scan.
    #[must_use]
    pub fn readings(&self) -> SensorReadings {
        self.readings
    }

    /// Recasts every ray from `center` for an agent facing `angle`.
    pub fn scan(
        &mut self,
        center: Vec2,
        angle: f64,
        environment: &Environment,
        config: &SensorConfig,
    ) {
        self.hits.clear();
        let mut readings = [0; SENSOR_COUNT];
        for (reading, offset) in readings.iter_mut().zip(config.offsets) {
            let hit = cast_ray(center, angle + offset, environment, config.max_range);
            *reading = scale_distance(hit.distance, config.reading_scale);
            self.hits.push(hit);
        }
        self.readings = SensorReadings(readings);
    }
}

fn scale_distance(distance: u32, scale: u32) -> i32 {
    let scaled = distance.checked_div(scale).unwrap_or(distance);
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Origins sit at y >= 512 so that the tiny sine of 360° does not move a horizontal
    // ray onto the row above within the tested distances.

    #[test]
    fn test_ray_stops_at_single_impassable_point() {
        let env = Environment::from_fn(400, 700, |x, y| (x, y) == (150, 600)).unwrap();
        let hit = cast_ray(Vec2::new(100.0, 600.0), 0.0, &env, 300);
        assert_eq!(hit.hit_point, Point::new(150, 600));
        assert_eq!(hit.distance, 50);
    }

    #[test]
    fn test_ray_caps_at_max_range() {
        let env = Environment::passable(1000, 1000).unwrap();
        let hit = cast_ray(Vec2::new(100.0, 600.0), 0.0, &env, 300);
        assert_eq!(hit.hit_point.x, 400);
        assert_eq!(hit.distance, 300);
    }

    #[test]
    fn test_ray_stops_at_environment_edge() {
        let env = Environment::passable(200, 200).unwrap();
        let hit = cast_ray(Vec2::new(30.0, 50.0), 180.0, &env, 300);
        assert_eq!(hit.hit_point, Point::new(-1, 50));
        assert_eq!(hit.distance, 31);
    }

    #[test]
    fn test_ray_from_impassable_origin_has_zero_length() {
        let env = Environment::from_fn(10, 10, |_, _| true).unwrap();
        let hit = cast_ray(Vec2::new(5.0, 5.0), 45.0, &env, 300);
        assert_eq!(hit.hit_point, Point::new(5, 5));
        assert_eq!(hit.distance, 0);
    }

    #[test]
    fn test_distance_is_within_one_of_obstacle_distance() {
        let origin = Vec2::new(300.0, 300.0);
        for k in [1_u32, 7, 50, 123, 299] {
            for heading in [30.0, 45.0, 135.0, 200.0, 250.0] {
                let wall = origin.offset(heading, f64::from(k)).to_point();
                let env = Environment::from_fn(700, 700, |x, y| {
                    i64::try_from(x).unwrap() == wall.x && i64::try_from(y).unwrap() == wall.y
                })
                .unwrap();
                let hit = cast_ray(origin, heading, &env, 300);
                assert_eq!(hit.hit_point, wall);
                assert!(
                    hit.distance + 1 >= k && hit.distance <= k + 1,
                    "k={k} heading={heading} distance={}",
                    hit.distance
                );
            }
        }
    }

    #[test]
    fn test_scan_keeps_sensor_order() {
        let env =
            Environment::from_fn(1000, 1000, |x, y| x >= 690 || y <= 540 || y >= 630).unwrap();
        let mut sensors = SensorArray::new();
        assert!(sensors.hits().is_empty());
        assert_eq!(sensors.readings(), SensorReadings::default());

        sensors.scan(Vec2::new(600.0, 600.0), 0.0, &env, &SensorConfig::default());
        assert_eq!(sensors.hits().len(), SENSOR_COUNT);
        let readings = sensors.readings();
        // -90 looks down the screen (30 away), 0 looks right (90), 90 looks up (60)
        assert_eq!(readings[0], 1);
        assert_eq!(readings[2], 3);
        assert_eq!(readings[4], 2);
        assert_eq!(sensors.hits()[2].hit_point, Point::new(690, 600));
    }

    #[test]
    fn test_rescan_replaces_previous_hits() {
        let env = Environment::passable(1000, 1000).unwrap();
        let config = SensorConfig::default();
        let mut sensors = SensorArray::new();
        sensors.scan(Vec2::new(600.0, 600.0), 0.0, &env, &config);
        let first = sensors.readings();
        sensors.scan(Vec2::new(600.0, 600.0), 0.0, &env, &config);
        assert_eq!(sensors.hits().len(), SENSOR_COUNT);
        assert_eq!(sensors.readings(), first);
        assert_eq!(first[2], 10);
    }

    #[test]
    fn test_zero_scale_keeps_raw_distance() {
        assert_eq!(scale_distance(95, 30), 3);
        assert_eq!(scale_distance(95, 0), 95);
    }
}
