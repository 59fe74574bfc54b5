use serde::{Deserialize, Serialize};

/// Unit direction vector for a heading given in degrees.
///
/// # Heading convention
///
/// Headings are measured in degrees with 0° pointing along +x and growing
/// counter-clockwise *as seen on screen*. Screen space has its y-axis pointing down, so
/// the trigonometric angle is `360 - heading`:
///
/// ```text
///            90°
///             ↑  (-y on screen)
///   180° ←  agent  → 0°
///             ↓  (+y on screen)
///           270°
/// ```
///
/// Every direction in the engine (movement, corners, sensor rays) goes through this
/// function so that turning left always rotates toward the top of the screen.
///
/// # Examples
///
/// ```
/// use oxidrive_engine::heading_vector;
///
/// let up = heading_vector(90.0);
/// assert!(up.x.abs() < 1e-9);
/// assert!((up.y + 1.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn heading_vector(heading: f64) -> Vec2 {
    let theta = (360.0 - heading).to_radians();
    Vec2::new(theta.cos(), theta.sin())
}

/// A point in continuous screen space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Moves `length` units along `heading` (see [`heading_vector`]).
    #[must_use]
    pub fn offset(self, heading: f64, length: f64) -> Self {
        let dir = heading_vector(heading);
        Self::new(self.x + dir.x * length, self.y + dir.y * length)
    }

    /// Truncates both coordinates toward zero.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(self.x as i64, self.y as i64)
    }
}

/// An integer point on the environment grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_heading_zero_points_right() {
        assert_close(heading_vector(0.0), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_positive_heading_turns_toward_screen_top() {
        assert_close(heading_vector(90.0), Vec2::new(0.0, -1.0));
        assert_close(heading_vector(-90.0), Vec2::new(0.0, 1.0));
        assert_close(heading_vector(180.0), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_offset_moves_along_heading() {
        let p = Vec2::new(10.0, 10.0).offset(90.0, 5.0);
        assert_close(p, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn test_to_point_truncates_toward_zero() {
        assert_eq!(Vec2::new(3.9, -2.7).to_point(), Point::new(3, -2));
        assert_eq!(Vec2::new(-0.5, 0.5).to_point(), Point::new(0, 0));
    }
}
