//! Game settings
//!
//! Settings are read from `~/.config/ember/settings.toml`, or from a file named
//! on the command line.

use std::fs;
use std::path::{Path, PathBuf};

use ember_core::TimeConfig;
use ember_game::Key;
use serde::Deserialize;
use tracing::{info, warn};

/// All game settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub run: RunSettings,
    pub time: TimeConfig,
    pub input: InputScript,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ember"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from the config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }
}

/// How long and how fast the headless loop runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Level file to load
    pub level: PathBuf,
    /// Number of steps to run before exiting
    pub frames: u64,
    /// Seconds fed to each step
    pub fixed_delta: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            level: PathBuf::from("assets/levels/level1.toml"),
            frames: 600,
            fixed_delta: 1.0 / 60.0,
        }
    }
}

/// Key presses replayed by the headless loop
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputScript {
    pub presses: Vec<ScriptedPress>,
}

impl InputScript {
    /// Keys pressed on `frame` (1-based), in script order
    pub fn keys_for(&self, frame: u64) -> Vec<Key> {
        self.presses
            .iter()
            .filter(|press| press.frame == frame)
            .map(|press| press.key)
            .collect()
    }
}

/// A single key press on a given frame
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptedPress {
    pub frame: u64,
    pub key: Key,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: GameSettings = toml::from_str(
            r#"
[run]
frames = 30

[[input.presses]]
frame = 2
key = "right"

[[input.presses]]
frame = 2
key = "space"

[[input.presses]]
frame = 4
key = "pause"
"#,
        )
        .unwrap();
        assert_eq!(settings.run.frames, 30);
        assert_eq!(settings.run.level, RunSettings::default().level);
        assert_eq!(settings.time.max_delta_time, TimeConfig::default().max_delta_time);
        assert_eq!(settings.input.keys_for(2), vec![Key::Right, Key::Space]);
        assert!(settings.input.keys_for(3).is_empty());
        assert_eq!(settings.input.keys_for(4), vec![Key::Pause]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = GameSettings::load_from(Path::new("does/not/exist.toml"));
        assert_eq!(settings.run.frames, RunSettings::default().frames);
    }
}
