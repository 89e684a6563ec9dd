//! Ember Core - Core types and utilities for the Ember engine
//!
//! This crate provides the foundational types shared by the ECS, the gameplay
//! layer and the frame loop:
//! - 2D math primitives (re-exported from glam)
//! - Per-step game time
//! - World bounds owned by the frame loop and lent to systems

pub mod time;
pub mod types;

pub use glam::Vec2;
pub use time::{GameTime, TimeConfig};
pub use types::WorldBounds;
