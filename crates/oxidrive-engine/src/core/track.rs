use serde::{Deserialize, Serialize};

use crate::{Environment, EnvironmentError};

/// Procedural oval racetrack.
///
/// The drivable surface is the ring between two concentric ellipses centered on the
/// field. Everything outside the outer ellipse and inside the inner one is border.
///
/// The defaults match the default [`AgentConfig`](crate::AgentConfig): a 1600×900 field
/// whose bottom straight contains the default spawn point.
///
/// ```text
///  ##################
///  ####.........#####
///  ##....######....##
///  ##....######....##
///  ####.........#####
///  ##################
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvalTrack {
    pub width: usize,
    pub height: usize,
    /// Semi-axes `(a, b)` of the outer edge.
    pub outer: (f64, f64),
    /// Semi-axes `(a, b)` of the inner edge.
    pub inner: (f64, f64),
}

impl Default for OvalTrack {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            outer: (760.0, 430.0),
            inner: (540.0, 230.0),
        }
    }
}

impl OvalTrack {
    /// Returns whether the point lies on the border (off the ring).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let norm = |(a, b): (f64, f64)| (dx / a).powi(2) + (dy / b).powi(2);
        norm(self.outer) > 1.0 || norm(self.inner) < 1.0
    }

    pub fn to_environment(&self) -> Result<Environment, EnvironmentError> {
        Environment::from_fn(self.width, self.height, |x, y| self.is_border(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_passable_and_rest_is_border() {
        let track = OvalTrack::default();
        let env = track.to_environment().unwrap();
        // field corners and center
        assert!(env.is_impassable(0, 0));
        assert!(env.is_impassable(1599, 899));
        assert!(env.is_impassable(800, 450));
        // bottom straight, left and right bends
        assert!(!env.is_impassable(800, 800));
        assert!(!env.is_impassable(100, 450));
        assert!(!env.is_impassable(1500, 450));
    }

    #[test]
    fn test_default_spawn_area_is_on_the_ring() {
        let env = OvalTrack::default().to_environment().unwrap();
        for y in 790..=860 {
            for x in 790..=890 {
                assert!(!env.is_impassable(x, y), "({x}, {y})");
            }
        }
    }
}
