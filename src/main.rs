//! Ember - a small 2D ECS game engine
//!
//! Runs a level headless for a fixed number of steps, replaying scripted input.
//! Usage: `ember [settings.toml]`

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ember_game::{Game, Health, Level};
use settings::GameSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Ember...");

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => GameSettings::load_from(&path),
        None => GameSettings::load(),
    };

    let level = Level::load(&settings.run.level)
        .with_context(|| format!("Failed to load level {:?}", settings.run.level))?;

    let mut game = Game::new(settings.time.clone()).context("Failed to register systems")?;
    game.load_level(&level).context("Failed to spawn level")?;

    let mut frame = 0;
    while frame < settings.run.frames && game.is_running() {
        frame += 1;
        let keys = settings.input.keys_for(frame);
        game.step(&keys, settings.run.fixed_delta)
            .with_context(|| format!("Step {frame} failed"))?;
    }

    let registry = game.registry();
    info!(
        "Stopped after {} frames ({:.2}s simulated), {} entities alive",
        frame,
        game.time().total_time,
        registry.entity_count()
    );
    match registry.entity_by_tag("player") {
        Ok(player) => {
            if let Ok(health) = registry.get_component::<Health>(player) {
                info!("Player health: {}%", health.health_percentage);
            }
        }
        Err(_) => warn!("Player was destroyed"),
    }

    Ok(())
}
