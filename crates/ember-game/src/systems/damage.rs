use std::rc::Rc;

use ember_ecs::{EcsResult, Entity, EventBus, Registry, Signature, System};
use tracing::{debug, info};

use crate::components::{BoxCollider, Health, Projectile};
use crate::events::Collision;

/// Applies projectile hits reported by the collision pass.
///
/// Hostile projectiles hurt the entity tagged `"player"`, friendly ones hurt
/// members of the `"enemies"` group. A projectile is spent on its first hit.
pub struct DamageSystem {
    signature: Signature,
}

impl DamageSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<BoxCollider>();
        Self { signature }
    }

    pub fn subscribe_to_events(self: &Rc<Self>, events: &EventBus) {
        let this = Rc::clone(self);
        events.subscribe::<Collision, _>(move |registry, _, collision| {
            this.on_collision(registry, collision)
        });
    }

    fn on_collision(&self, registry: &mut Registry, collision: &Collision) -> EcsResult<()> {
        let Collision { a, b } = *collision;
        debug!("collision between {a} and {b}");

        // Either side may already have been consumed earlier this step.
        if registry.is_pending_kill(a) || registry.is_pending_kill(b) {
            return Ok(());
        }

        for (projectile, target) in [(a, b), (b, a)] {
            if !registry.belongs_to_group(projectile, "projectiles") {
                continue;
            }
            if registry.entity_has_tag(target, "player") {
                self.on_projectile_hit(registry, projectile, target, false)?;
            } else if registry.belongs_to_group(target, "enemies") {
                self.on_projectile_hit(registry, projectile, target, true)?;
            }
        }
        Ok(())
    }

    /// Resolve a hit if the projectile's allegiance matches `friendly`.
    fn on_projectile_hit(
        &self,
        registry: &mut Registry,
        projectile: Entity,
        target: Entity,
        friendly: bool,
    ) -> EcsResult<()> {
        if registry.is_pending_kill(projectile) {
            return Ok(());
        }
        let hit = *registry.get_component::<Projectile>(projectile)?;
        if hit.is_friendly != friendly {
            return Ok(());
        }

        let health = registry.get_component_mut::<Health>(target)?;
        health.health_percentage -= hit.hit_percent_damage;
        let remaining = health.health_percentage;
        debug!("{target} hit for {} (health {remaining})", hit.hit_percent_damage);

        if remaining <= 0 {
            info!("entity {target} destroyed");
            registry.kill_entity(target)?;
        }
        registry.kill_entity(projectile)
    }
}

impl Default for DamageSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DamageSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}
