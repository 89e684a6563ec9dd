//! Gameplay systems
//!
//! Each system declares its required components through [`ember_ecs::System`]
//! and exposes its own `update` taking the per-step context it needs.
//! Systems that react to events also expose `subscribe_to_events`, called once
//! per step after the event bus is reset.

mod collision;
mod damage;
mod keyboard_control;
mod movement;
mod projectile;

pub use collision::CollisionSystem;
pub use damage::DamageSystem;
pub use keyboard_control::KeyboardControlSystem;
pub use movement::MovementSystem;
pub use projectile::{ProjectileEmitSystem, ProjectileLifecycleSystem};
