//! Ember Game - 2D gameplay on top of the Ember ECS
//!
//! Components, events and systems for a top-down shooter, plus the TOML level
//! loader that populates a [`Registry`](ember_ecs::Registry) and the [`Game`]
//! session that steps them.

pub mod components;
pub mod events;
pub mod game;
pub mod level;
pub mod systems;

pub use components::{
    BoxCollider, CameraFollow, Health, KeyboardControl, Projectile, ProjectileEmitter, Rigidbody,
    Sprite, Transform,
};
pub use events::{Collision, Key, KeyPressed};
pub use game::Game;
pub use level::{Level, LevelError};
pub use systems::{
    CollisionSystem, DamageSystem, KeyboardControlSystem, MovementSystem, ProjectileEmitSystem,
    ProjectileLifecycleSystem,
};
