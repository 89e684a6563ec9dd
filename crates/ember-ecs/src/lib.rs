//! Ember ECS - Entity Component System
//!
//! Generational entities, sparse-set component storage, signature-matched
//! systems, unique tags, named groups and a synchronous event bus.
//!
//! Entity creation and destruction are deferred: requests queue up and take
//! effect when [`Registry::update`] runs at the start of each step.

mod component;
mod entity;
mod error;
mod event;
mod handle;
mod registry;
mod signature;
mod storage;
mod system;
mod tags;

pub use component::{component_id, Component, ComponentId};
pub use entity::Entity;
pub use error::{EcsError, EcsResult};
pub use event::{Event, EventBus};
pub use handle::EntityHandle;
pub use registry::Registry;
pub use signature::{Signature, MAX_COMPONENTS};
pub use system::System;
