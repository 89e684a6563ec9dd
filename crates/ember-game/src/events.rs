//! Gameplay events carried on the [`EventBus`](ember_ecs::EventBus)

use ember_ecs::Entity;
use serde::{Deserialize, Serialize};

/// Keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Up,
    Right,
    Down,
    Left,
    /// Fire (camera-followed emitters)
    Space,
    /// Quit the frame loop
    Escape,
    /// Freeze or unfreeze game time
    Pause,
}

/// A key went down this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressed {
    pub key: Key,
}

/// Two colliders overlap. Emitted once per unordered pair per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub a: Entity,
    pub b: Entity,
}

impl Collision {
    /// Whether `entity` is one side of this collision.
    pub fn involves(&self, entity: Entity) -> bool {
        self.a == entity || self.b == entity
    }
}
