use ember_core::WorldBounds;
use ember_ecs::{EcsResult, Registry, Signature, System};
use tracing::trace;

use crate::components::{Rigidbody, Transform};

/// Integrates velocity into position.
///
/// Anything that leaves the world bounds is killed, except the entity tagged
/// `"player"`.
pub struct MovementSystem {
    signature: Signature,
}

impl MovementSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<Transform>();
        signature.require_component::<Rigidbody>();
        Self { signature }
    }

    pub fn update(
        &self,
        registry: &mut Registry,
        delta_time: f32,
        bounds: &WorldBounds,
    ) -> EcsResult<()> {
        for entity in registry.system_entities::<Self>()? {
            let velocity = registry.get_component::<Rigidbody>(entity)?.velocity;
            let transform = registry.get_component_mut::<Transform>(entity)?;
            transform.position += velocity * delta_time;
            let position = transform.position;

            if !bounds.contains(position) && !registry.entity_has_tag(entity, "player") {
                trace!("entity {entity} left the map at {position}");
                registry.kill_entity(entity)?;
            }
        }
        Ok(())
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}
