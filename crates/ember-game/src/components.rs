//! Gameplay components
//!
//! Plain data attached to entities. Every component deserializes from a level
//! file, with omitted fields taking their defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World placement of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// Unscaled, unrotated transform at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Linear velocity in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rigidbody {
    pub velocity: Vec2,
}

impl Rigidbody {
    pub fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

/// Reference to a region of a texture.
///
/// The source rectangle is `width` x `height` starting at (`src_x`, `src_y`);
/// animated sheets pick their row by moving `src_y`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sprite {
    pub asset_id: String,
    pub width: u32,
    pub height: u32,
    pub z_index: i32,
    /// Drawn in screen space, ignoring the camera
    pub fixed: bool,
    pub src_x: u32,
    pub src_y: u32,
}

impl Sprite {
    pub fn new(asset_id: impl Into<String>, width: u32, height: u32, z_index: i32) -> Self {
        Self {
            asset_id: asset_id.into(),
            width,
            height,
            z_index,
            ..Self::default()
        }
    }

    /// Size of the sprite in world units once `transform` scaling is applied.
    pub fn scaled_size(&self, transform: &Transform) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * transform.scale
    }
}

/// Axis-aligned collision box centred on the entity position plus `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxCollider {
    pub width: u32,
    pub height: u32,
    pub offset: Vec2,
}

impl BoxCollider {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// Minimum and maximum corners of the box for an entity at `position`.
    pub fn bounds(&self, position: Vec2) -> (Vec2, Vec2) {
        let half = Vec2::new(self.width as f32, self.height as f32) / 2.0;
        let center = position + self.offset;
        (center - half, center + half)
    }
}

/// Remaining health in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub health_percentage: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            health_percentage: 100,
        }
    }
}

impl Health {
    pub fn new(health_percentage: i32) -> Self {
        Self { health_percentage }
    }
}

/// Velocities applied when the matching arrow key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardControl {
    pub up_velocity: Vec2,
    pub right_velocity: Vec2,
    pub down_velocity: Vec2,
    pub left_velocity: Vec2,
}

impl KeyboardControl {
    /// Same speed in all four directions.
    pub fn uniform(speed: f32) -> Self {
        Self {
            up_velocity: Vec2::new(0.0, -speed),
            right_velocity: Vec2::new(speed, 0.0),
            down_velocity: Vec2::new(0.0, speed),
            left_velocity: Vec2::new(-speed, 0.0),
        }
    }
}

/// Marks the entity the camera tracks. Such entities fire on the space key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraFollow;

/// Spawns projectiles, either on demand or every `repeat_frequency` ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileEmitter {
    pub projectile_velocity: Vec2,
    /// Milliseconds between automatic shots. Zero disables automatic fire.
    pub repeat_frequency: u64,
    /// Lifetime of each projectile in milliseconds
    pub projectile_duration: u64,
    pub hit_percent_damage: i32,
    pub is_friendly: bool,
    /// Game time of the last automatic shot, in milliseconds
    #[serde(skip)]
    pub last_emission_time: u64,
}

impl Default for ProjectileEmitter {
    fn default() -> Self {
        Self {
            projectile_velocity: Vec2::new(100.0, 0.0),
            repeat_frequency: 0,
            projectile_duration: 10_000,
            hit_percent_damage: 10,
            is_friendly: false,
            last_emission_time: 0,
        }
    }
}

/// A live projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub is_friendly: bool,
    pub hit_percent_damage: i32,
    /// Lifetime in milliseconds
    pub duration: u64,
    /// Game time at which the projectile was fired, in milliseconds
    pub start_time: u64,
}

impl Projectile {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_time) > self.duration
    }
}
