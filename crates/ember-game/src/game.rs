//! Frame loop
//!
//! [`Game`] owns the registry, the event bus, game time and the world bounds,
//! and advances them one step at a time.

use ember_core::{GameTime, TimeConfig, WorldBounds};
use ember_ecs::{EcsResult, EventBus, Registry};
use tracing::{debug, info};

use crate::events::{Key, KeyPressed};
use crate::level::{Level, LevelError};
use crate::systems::{
    CollisionSystem, DamageSystem, KeyboardControlSystem, MovementSystem, ProjectileEmitSystem,
    ProjectileLifecycleSystem,
};

/// A running game session.
pub struct Game {
    registry: Registry,
    events: EventBus,
    time: GameTime,
    bounds: WorldBounds,
    running: bool,
}

impl Game {
    /// Create a session with every gameplay system registered and no entities.
    pub fn new(time_config: TimeConfig) -> EcsResult<Self> {
        let mut registry = Registry::new();
        registry.add_system(MovementSystem::new())?;
        registry.add_system(CollisionSystem::new())?;
        registry.add_system(DamageSystem::new())?;
        registry.add_system(KeyboardControlSystem::new())?;
        registry.add_system(ProjectileEmitSystem::new())?;
        registry.add_system(ProjectileLifecycleSystem::new())?;

        Ok(Self {
            registry,
            events: EventBus::new(),
            time: GameTime::new(time_config),
            bounds: WorldBounds::default(),
            running: true,
        })
    }

    /// Spawn a level. Its map size replaces the current world bounds.
    ///
    /// A level that fails to load leaves the registry and the bounds unchanged.
    pub fn load_level(&mut self, level: &Level) -> Result<(), LevelError> {
        self.bounds = level.spawn(&mut self.registry)?;
        info!(
            "Level ready: {}x{} world, {} entities",
            self.bounds.width,
            self.bounds.height,
            self.registry.entity_count()
        );
        Ok(())
    }

    /// Freeze game time. Steps still run, with a zero delta and a stopped clock.
    pub fn pause(&mut self) {
        self.time.pause();
    }

    pub fn resume(&mut self) {
        self.time.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.time.paused
    }

    /// Advance the game by one step.
    ///
    /// Key presses go to the handlers subscribed during the previous step.
    /// `Escape` also stops the game, and `Pause` toggles the pause from the next
    /// step on. The bus is then reset and every system subscribes again, pending
    /// entity changes are flushed, and the systems update in a fixed order.
    pub fn step(&mut self, keys: &[Key], raw_delta: f32) -> EcsResult<()> {
        self.time.update(raw_delta);

        for &key in keys {
            match key {
                Key::Escape => {
                    info!("Escape pressed, stopping");
                    self.running = false;
                }
                Key::Pause => {
                    self.time.toggle_pause();
                    info!(paused = self.time.paused, "pause toggled");
                }
                _ => {}
            }
            self.events.emit(&mut self.registry, KeyPressed { key })?;
        }

        self.events.reset();
        self.registry
            .system::<DamageSystem>()?
            .subscribe_to_events(&self.events);
        self.registry
            .system::<KeyboardControlSystem>()?
            .subscribe_to_events(&self.events);
        self.registry
            .system::<ProjectileEmitSystem>()?
            .subscribe_to_events(&self.events);

        self.registry.update();

        let now = self.time.elapsed_millis();
        self.registry
            .system::<MovementSystem>()?
            .update(&mut self.registry, self.time.delta_time, &self.bounds)?;
        self.registry
            .system::<CollisionSystem>()?
            .update(&mut self.registry, &self.events)?;
        self.registry
            .system::<ProjectileEmitSystem>()?
            .update(&mut self.registry, now)?;
        self.registry
            .system::<ProjectileLifecycleSystem>()?
            .update(&mut self.registry, now)?;

        debug!(
            frame = self.time.frame_count,
            entities = self.registry.entity_count(),
            "step complete"
        );
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// `false` once the player asked to quit.
    pub fn is_running(&self) -> bool {
        self.running
    }
}
