//! Time system for the Ember engine
//!
//! Tracks per-step delta time and the total simulated time. The frame loop owns a
//! [`GameTime`] and hands the values it needs to each system.

use serde::{Deserialize, Serialize};

/// Configuration for game time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many in-game seconds pass per real second
    pub time_scale: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Game time tracking
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Time since game start in seconds
    pub total_time: f64,
    /// Delta time for this step (clamped and scaled)
    pub delta_time: f32,
    /// Unscaled delta time
    pub unscaled_delta_time: f32,
    /// Step counter
    pub frame_count: u64,
    /// Whether the game is paused
    pub paused: bool,
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Update the game time with the raw delta from the previous step
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
    }

    /// Total simulated time in whole milliseconds.
    ///
    /// Timers on components (emission intervals, projectile lifetimes) are kept
    /// in milliseconds against this clock.
    pub fn elapsed_millis(&self) -> u64 {
        (self.total_time * 1000.0) as u64
    }

    /// Pause the game
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the game
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set the time scale (0.0 = frozen, 1.0 = normal, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}
