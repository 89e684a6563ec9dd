use ember_ecs::{EcsResult, EventBus, Registry, Signature, System};
use glam::Vec2;
use tracing::trace;

use crate::components::{BoxCollider, Transform};
use crate::events::Collision;

/// Detects overlapping colliders and emits a [`Collision`] for each pair.
pub struct CollisionSystem {
    signature: Signature,
}

impl CollisionSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<Transform>();
        signature.require_component::<BoxCollider>();
        Self { signature }
    }

    pub fn update(&self, registry: &mut Registry, events: &EventBus) -> EcsResult<()> {
        let entities = registry.system_entities::<Self>()?;
        let mut boxes = Vec::with_capacity(entities.len());
        for &entity in &entities {
            let position = registry.get_component::<Transform>(entity)?.position;
            boxes.push(registry.get_component::<BoxCollider>(entity)?.bounds(position));
        }

        for i in 0..entities.len() {
            for j in (i + 1)..entities.len() {
                if overlaps(boxes[i], boxes[j]) {
                    let (a, b) = (entities[i], entities[j]);
                    trace!("collision between {a} and {b}");
                    events.emit(registry, Collision { a, b })?;
                }
            }
        }
        Ok(())
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollisionSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}

/// Strict AABB overlap. Boxes that only share an edge do not collide.
fn overlaps((min_a, max_a): (Vec2, Vec2), (min_b, max_b): (Vec2, Vec2)) -> bool {
    min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use ember_ecs::Entity;

    fn spawn_box(registry: &mut Registry, x: f32, y: f32, size: u32) -> Entity {
        registry
            .spawn()
            .add_component(Transform::at(Vec2::new(x, y)))
            .unwrap()
            .add_component(BoxCollider::new(size, size))
            .unwrap()
            .id()
    }

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = BoxCollider::new(10, 10).bounds(Vec2::ZERO);
        let touching = BoxCollider::new(10, 10).bounds(Vec2::new(10.0, 0.0));
        let inside = BoxCollider::new(2, 2).bounds(Vec2::new(4.0, 4.0));
        assert!(!overlaps(a, touching));
        assert!(overlaps(a, inside));
        assert!(overlaps(inside, a));
    }

    #[test]
    fn emits_one_event_per_overlapping_pair() {
        let mut registry = Registry::new();
        registry.add_system(CollisionSystem::new()).unwrap();
        let a = spawn_box(&mut registry, 0.0, 0.0, 32);
        let b = spawn_box(&mut registry, 10.0, 10.0, 32);
        let far = spawn_box(&mut registry, 500.0, 500.0, 32);
        registry.update();

        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        bus.subscribe::<Collision, _>(move |_, _, collision| {
            log.borrow_mut().push(*collision);
            Ok(())
        });

        let collision = registry.system::<CollisionSystem>().unwrap();
        collision.update(&mut registry, &bus).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].involves(a) && seen[0].involves(b));
        assert!(!seen[0].involves(far));
    }
}
