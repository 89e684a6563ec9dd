//! Core types used throughout the Ember engine

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Playable area of the current level, in world units.
///
/// Produced by the level loader and owned by the frame loop, which passes it by
/// reference to the systems that need it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies inside the bounds (edges inclusive).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1280.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let bounds = WorldBounds::new(100.0, 50.0);
        assert!(bounds.contains(Vec2::new(0.0, 0.0)));
        assert!(bounds.contains(Vec2::new(100.0, 50.0)));
        assert!(!bounds.contains(Vec2::new(100.1, 10.0)));
        assert!(!bounds.contains(Vec2::new(10.0, -0.5)));
    }
}
