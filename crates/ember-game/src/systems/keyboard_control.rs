use std::rc::Rc;

use ember_ecs::{EcsResult, EventBus, Registry, Signature, System};
use tracing::debug;

use crate::components::{KeyboardControl, Rigidbody, Sprite};
use crate::events::{Key, KeyPressed};

/// Steers keyboard-controlled entities with the arrow keys and turns their
/// sprite to face the direction of travel.
pub struct KeyboardControlSystem {
    signature: Signature,
}

impl KeyboardControlSystem {
    pub fn new() -> Self {
        let mut signature = Signature::new();
        signature.require_component::<KeyboardControl>();
        signature.require_component::<Rigidbody>();
        signature.require_component::<Sprite>();
        Self { signature }
    }

    pub fn subscribe_to_events(self: &Rc<Self>, events: &EventBus) {
        let this = Rc::clone(self);
        events.subscribe::<KeyPressed, _>(move |registry, _, event| {
            this.on_key_pressed(registry, event.key)
        });
    }

    fn on_key_pressed(&self, registry: &mut Registry, key: Key) -> EcsResult<()> {
        debug!("key pressed: {key:?}");
        for entity in registry.system_entities::<Self>()? {
            let control = *registry.get_component::<KeyboardControl>(entity)?;
            let (velocity, row) = match key {
                Key::Up => (control.up_velocity, 0),
                Key::Right => (control.right_velocity, 1),
                Key::Down => (control.down_velocity, 2),
                Key::Left => (control.left_velocity, 3),
                Key::Space | Key::Escape | Key::Pause => return Ok(()),
            };

            registry.get_component_mut::<Rigidbody>(entity)?.velocity = velocity;
            let sprite = registry.get_component_mut::<Sprite>(entity)?;
            sprite.src_y = sprite.height * row;
        }
        Ok(())
    }
}

impl Default for KeyboardControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for KeyboardControlSystem {
    fn signature(&self) -> Signature {
        self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn arrow_keys_set_velocity_and_sprite_row() {
        let mut registry = Registry::new();
        registry.add_system(KeyboardControlSystem::new()).unwrap();
        let chopper = registry
            .spawn()
            .add_component(KeyboardControl::uniform(200.0))
            .unwrap()
            .add_component(Rigidbody::default())
            .unwrap()
            .add_component(Sprite::new("chopper-image", 32, 32, 1))
            .unwrap()
            .id();
        registry.update();

        let bus = EventBus::new();
        registry
            .system::<KeyboardControlSystem>()
            .unwrap()
            .subscribe_to_events(&bus);

        bus.emit(&mut registry, KeyPressed { key: Key::Left }).unwrap();
        assert_eq!(
            registry.get_component::<Rigidbody>(chopper).unwrap().velocity,
            Vec2::new(-200.0, 0.0)
        );
        assert_eq!(registry.get_component::<Sprite>(chopper).unwrap().src_y, 96);

        bus.emit(&mut registry, KeyPressed { key: Key::Down }).unwrap();
        assert_eq!(
            registry.get_component::<Rigidbody>(chopper).unwrap().velocity,
            Vec2::new(0.0, 200.0)
        );
        assert_eq!(registry.get_component::<Sprite>(chopper).unwrap().src_y, 64);

        bus.emit(&mut registry, KeyPressed { key: Key::Space }).unwrap();
        assert_eq!(
            registry.get_component::<Rigidbody>(chopper).unwrap().velocity,
            Vec2::new(0.0, 200.0)
        );
    }
}
