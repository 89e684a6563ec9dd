//! Level loading
//!
//! A level is a TOML document with a `[map]` table describing the tile grid and
//! any number of `[[entity]]` tables, each with an optional tag, an optional
//! group and one sub-table per component:
//!
//! ```toml
//! [map]
//! tile_size = 32
//! scale = 2.0
//! cols = 25
//! rows = 20
//!
//! [[entity]]
//! tag = "player"
//! camera_follow = true
//! transform = { position = [10.0, 100.0] }
//! rigidbody = { velocity = [0.0, 0.0] }
//! sprite = { asset_id = "chopper-image", width = 32, height = 32, z_index = 1 }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ember_core::WorldBounds;
use ember_ecs::{EcsError, Registry};
use glam::Vec2;
use serde::Deserialize;
use tracing::{debug, info};

use crate::components::{
    BoxCollider, CameraFollow, Health, KeyboardControl, ProjectileEmitter, Rigidbody, Sprite,
    Transform,
};

/// Errors that can occur while loading a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tile '{cell}' at row {row}, column {col}")]
    InvalidTile { row: usize, col: usize, cell: String },

    #[error("tile layout is {found_cols}x{found_rows}, expected {cols}x{rows}")]
    LayoutSize {
        cols: u32,
        rows: u32,
        found_cols: usize,
        found_rows: usize,
    },

    #[error("tag '{0}' is given to more than one entity")]
    DuplicateTag(String),

    #[error("entity #{index} ({name}) has a box collider but no health")]
    MissingHealth { index: usize, name: String },

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Tile grid of a level. Its size in world units defines the world bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileMap {
    /// Edge length of one tile in the tile sheet, in pixels
    pub tile_size: u32,
    /// Scale applied to every tile when placed in the world
    pub scale: f32,
    pub cols: u32,
    pub rows: u32,
    /// Texture holding the tile sheet
    pub asset_id: String,
    /// One line per row of comma-separated cells. Each cell is two digits: the
    /// sheet row followed by the sheet column of the tile. Without a layout no
    /// tile entities are created.
    pub layout: Option<String>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self {
            tile_size: 32,
            scale: 2.0,
            cols: 25,
            rows: 20,
            asset_id: "tilemap-image".to_string(),
            layout: None,
        }
    }
}

impl TileMap {
    /// World size covered by the map.
    pub fn bounds(&self) -> WorldBounds {
        let tile = self.tile_size as f32 * self.scale;
        WorldBounds::new(self.cols as f32 * tile, self.rows as f32 * tile)
    }

    /// Parse the layout into `(sheet_row, sheet_col)` pairs, row-major.
    fn cells(&self) -> Result<Vec<Vec<(u32, u32)>>, LevelError> {
        let Some(layout) = &self.layout else {
            return Ok(Vec::new());
        };

        let mut grid = Vec::new();
        for (row, line) in layout.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let mut cells = Vec::new();
            for (col, cell) in line.split(',').map(str::trim).filter(|c| !c.is_empty()).enumerate() {
                let digits: Vec<u32> = cell.chars().filter_map(|c| c.to_digit(10)).collect();
                match digits.as_slice() {
                    [sheet_row, sheet_col] if cell.len() == 2 => cells.push((*sheet_row, *sheet_col)),
                    _ => {
                        return Err(LevelError::InvalidTile {
                            row,
                            col,
                            cell: cell.to_string(),
                        })
                    }
                }
            }
            grid.push(cells);
        }

        let ragged = grid.iter().any(|cells| cells.len() != self.cols as usize);
        if grid.len() != self.rows as usize || ragged {
            return Err(LevelError::LayoutSize {
                cols: self.cols,
                rows: self.rows,
                found_cols: grid.first().map_or(0, Vec::len),
                found_rows: grid.len(),
            });
        }
        Ok(grid)
    }
}

/// One entity of a level and the components it starts with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntityDescription {
    pub tag: Option<String>,
    pub group: Option<String>,
    pub transform: Option<Transform>,
    pub rigidbody: Option<Rigidbody>,
    pub sprite: Option<Sprite>,
    pub box_collider: Option<BoxCollider>,
    pub health: Option<Health>,
    pub keyboard_control: Option<KeyboardControl>,
    pub camera_follow: bool,
    pub projectile_emitter: Option<ProjectileEmitter>,
}

/// A parsed level, ready to be spawned into a registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Level {
    pub map: TileMap,
    #[serde(rename = "entity")]
    pub entities: Vec<EntityDescription>,
}

impl Level {
    /// Read and parse a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_toml_str(&contents)?;
        info!(
            "Loaded level from {} ({} entities)",
            path.display(),
            level.entities.len()
        );
        Ok(level)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LevelError> {
        Ok(toml::from_str(contents)?)
    }

    /// Check the level against `registry` without creating anything.
    ///
    /// Tags must be unique within the level and unused in the registry. The
    /// player and members of "enemies" can take damage, so if they carry a box
    /// collider they also need health.
    pub fn validate(&self, registry: &Registry) -> Result<(), LevelError> {
        self.map.cells()?;

        let mut tags = HashSet::new();
        for (index, description) in self.entities.iter().enumerate() {
            if let Some(tag) = &description.tag {
                if !tags.insert(tag.as_str()) {
                    return Err(LevelError::DuplicateTag(tag.clone()));
                }
                if let Ok(holder) = registry.entity_by_tag(tag) {
                    return Err(EcsError::DuplicateTag {
                        tag: tag.clone(),
                        holder,
                    }
                    .into());
                }
            }

            let damageable = description.tag.as_deref() == Some("player")
                || description.group.as_deref() == Some("enemies");
            if damageable && description.box_collider.is_some() && description.health.is_none() {
                return Err(LevelError::MissingHealth {
                    index,
                    name: description
                        .tag
                        .clone()
                        .or_else(|| description.group.clone())
                        .unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    /// Create every tile and entity of the level. The new entities become
    /// visible to systems at the next flush.
    ///
    /// The level is validated first, so on error the registry is left untouched.
    /// Returns the bounds of the map.
    pub fn spawn(&self, registry: &mut Registry) -> Result<WorldBounds, LevelError> {
        self.validate(registry)?;

        let tile_world_size = self.map.tile_size as f32 * self.map.scale;
        let mut tiles = 0;
        for (y, row) in self.map.cells()?.into_iter().enumerate() {
            for (x, (sheet_row, sheet_col)) in row.into_iter().enumerate() {
                let sprite = Sprite {
                    src_x: sheet_col * self.map.tile_size,
                    src_y: sheet_row * self.map.tile_size,
                    ..Sprite::new(&self.map.asset_id, self.map.tile_size, self.map.tile_size, 0)
                };
                registry
                    .spawn()
                    .group("tiles")?
                    .add_component(Transform {
                        position: Vec2::new(x as f32, y as f32) * tile_world_size,
                        scale: Vec2::splat(self.map.scale),
                        rotation: 0.0,
                    })?
                    .add_component(sprite)?;
                tiles += 1;
            }
        }

        for description in &self.entities {
            spawn_entity(registry, description)?;
        }

        let bounds = self.map.bounds();
        debug!(
            tiles,
            entities = self.entities.len(),
            width = bounds.width,
            height = bounds.height,
            "spawned level"
        );
        Ok(bounds)
    }
}

fn spawn_entity(registry: &mut Registry, description: &EntityDescription) -> Result<(), LevelError> {
    let mut entity = registry.spawn();
    if let Some(tag) = &description.tag {
        entity.tag(tag.as_str())?;
    }
    if let Some(group) = &description.group {
        entity.group(group.as_str())?;
    }
    if let Some(transform) = description.transform {
        entity.add_component(transform)?;
    }
    if let Some(rigidbody) = description.rigidbody {
        entity.add_component(rigidbody)?;
    }
    if let Some(sprite) = &description.sprite {
        entity.add_component(sprite.clone())?;
    }
    if let Some(collider) = description.box_collider {
        entity.add_component(collider)?;
    }
    if let Some(health) = description.health {
        entity.add_component(health)?;
    }
    if let Some(control) = description.keyboard_control {
        entity.add_component(control)?;
    }
    if description.camera_follow {
        entity.add_component(CameraFollow)?;
    }
    if let Some(emitter) = description.projectile_emitter {
        entity.add_component(emitter)?;
    }
    Ok(())
}
