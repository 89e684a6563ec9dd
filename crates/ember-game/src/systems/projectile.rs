use std::cell::Cell;
use std::rc::Rc;

use ember_ecs::{EcsResult, Entity, EventBus, Registry, Signature, System};
use glam::Vec2;
use tracing::{debug, trace};

use crate::components::{
    BoxCollider, CameraFollow, Projectile, ProjectileEmitter, Rigidbody, Sprite, Transform,
};
use crate::events::{Key, KeyPressed};

/// Fires projectiles from emitters.
///
/// Camera-followed emitters fire on the space key in the direction they are
/// moving. Emitters with a non-zero `repeat_frequency` fire on their own
/// whenever that many milliseconds have passed since their last shot.
pub struct ProjectileEmitSystem {
    signature: Signature,
    /// Game time in milliseconds as of the last update.
    clock: Cell<u64>,
}

impl ProjectileEmitSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<ProjectileEmitter>();
        signature.require_component::<Transform>();
        Self {
            signature,
            clock: Cell::new(0),
        }
    }

    pub fn subscribe_to_events(self: &Rc<Self>, events: &EventBus) {
        let this = Rc::clone(self);
        events.subscribe::<KeyPressed, _>(move |registry, _, event| {
            if event.key == Key::Space {
                this.fire_manual(registry)?;
            }
            Ok(())
        });
    }

    fn fire_manual(&self, registry: &mut Registry) -> EcsResult<()> {
        for entity in registry.system_entities::<Self>()? {
            if !registry.has_component::<CameraFollow>(entity) {
                continue;
            }
            let emitter = *registry.get_component::<ProjectileEmitter>(entity)?;
            let direction = registry
                .get_component::<Rigidbody>(entity)
                .map_or(Vec2::ZERO, |rigidbody| heading(rigidbody.velocity));
            let velocity = emitter.projectile_velocity * direction;
            spawn_projectile(registry, entity, &emitter, velocity, self.clock.get())?;
        }
        Ok(())
    }

    /// Fire every automatic emitter whose interval has elapsed at `now_ms`.
    pub fn update(&self, registry: &mut Registry, now_ms: u64) -> EcsResult<()> {
        self.clock.set(now_ms);
        for entity in registry.system_entities::<Self>()? {
            let emitter = *registry.get_component::<ProjectileEmitter>(entity)?;
            if emitter.repeat_frequency == 0
                || now_ms.saturating_sub(emitter.last_emission_time) <= emitter.repeat_frequency
            {
                continue;
            }
            spawn_projectile(registry, entity, &emitter, emitter.projectile_velocity, now_ms)?;
            registry
                .get_component_mut::<ProjectileEmitter>(entity)?
                .last_emission_time = now_ms;
        }
        Ok(())
    }
}

impl Default for ProjectileEmitSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProjectileEmitSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}

/// Per-axis direction of travel: -1, 0 or 1.
fn heading(velocity: Vec2) -> Vec2 {
    let axis = |v: f32| if v == 0.0 { 0.0 } else { v.signum() };
    Vec2::new(axis(velocity.x), axis(velocity.y))
}

/// Create a projectile at the centre of `source`'s sprite (or its origin when it
/// has none).
fn spawn_projectile(
    registry: &mut Registry,
    source: Entity,
    emitter: &ProjectileEmitter,
    velocity: Vec2,
    now_ms: u64,
) -> EcsResult<Entity> {
    let transform = *registry.get_component::<Transform>(source)?;
    let mut position = transform.position;
    if let Ok(sprite) = registry.get_component::<Sprite>(source) {
        position += sprite.scaled_size(&transform) / 2.0;
    }

    let projectile = registry
        .spawn()
        .group("projectiles")?
        .add_component(Transform::at(position))?
        .add_component(Rigidbody::new(velocity))?
        .add_component(Sprite::new("bullet-image", 4, 4, 4))?
        .add_component(BoxCollider::new(4, 4))?
        .add_component(Projectile {
            is_friendly: emitter.is_friendly,
            hit_percent_damage: emitter.hit_percent_damage,
            duration: emitter.projectile_duration,
            start_time: now_ms,
        })?
        .id();
    trace!("{source} fired projectile {projectile} at {position}");
    Ok(projectile)
}

/// Removes projectiles that outlived their duration.
pub struct ProjectileLifecycleSystem {
    signature: Signature,
}

impl ProjectileLifecycleSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<Projectile>();
        Self { signature }
    }

    pub fn update(&self, registry: &mut Registry, now_ms: u64) -> EcsResult<()> {
        let mut expired = 0;
        for entity in registry.system_entities::<Self>()? {
            if registry.get_component::<Projectile>(entity)?.is_expired(now_ms) {
                registry.kill_entity(entity)?;
                expired += 1;
            }
        }
        if expired > 0 {
            debug!(expired, "projectiles expired");
        }
        Ok(())
    }
}

impl Default for ProjectileLifecycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProjectileLifecycleSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}
