//! # World Configuration
//!
//! Loaded once at session start from TOML:
//!
//! ```toml
//! width = 40
//! height = 4000
//! sky_height = 4
//! shallow_depth = 4
//! tile_size = 128.0
//! window_margin = 1.2
//! seed = 12345            # optional; fresh worlds roll one
//!
//! [[special_areas]]       # optional; omit for the built-in set
//! x = 22
//! y = 7
//! rows = [["stone_with_mushroom"]]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cell::GridGeometry;
use crate::error::{WorldError, WorldResult};
use crate::special_area::SpecialArea;
use crate::tile::TileType;

/// One authored area as written in the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAreaConfig {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Tiles, top row first.
    pub rows: Vec<Vec<TileType>>,
}

/// Static parameters of one world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid width in cells. Fixed for the lifetime of a save.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Rows above this are sky; this row is grass.
    pub sky_height: u32,
    /// Rows of shallow band below the grass row.
    pub shallow_depth: u32,
    /// World units per cell edge.
    pub tile_size: f32,
    /// Factor by which the visible rect is grown before materializing.
    pub window_margin: f32,
    /// Fixed seed; `None` lets a fresh session roll one.
    pub seed: Option<u64>,
    /// Explicit overlays; `None` selects the built-in set.
    pub special_areas: Option<Vec<SpecialAreaConfig>>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 4000,
            sky_height: Self::DEFAULT_SKY_HEIGHT,
            shallow_depth: Self::DEFAULT_SHALLOW_DEPTH,
            tile_size: 128.0,
            window_margin: 1.2,
            seed: None,
            special_areas: None,
        }
    }
}

impl WorldConfig {
    /// Default sky band height.
    pub const DEFAULT_SKY_HEIGHT: u32 = 4;

    /// Default shallow band depth below the grass row.
    pub const DEFAULT_SHALLOW_DEPTH: u32 = 4;

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidConfig` on malformed TOML or any failed
    /// validation rule.
    pub fn from_toml_str(text: &str) -> WorldResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| WorldError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidConfig` if the file cannot be read or
    /// does not validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            WorldError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the dimensional rules.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> WorldResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.sky_height >= self.height {
            return Err(WorldError::InvalidConfig(format!(
                "sky_height {} leaves no ground in a grid {} rows tall",
                self.sky_height, self.height
            )));
        }
        let shallow_end = self.sky_height.checked_add(self.shallow_depth);
        if !matches!(shallow_end, Some(end) if end < self.height) {
            return Err(WorldError::InvalidConfig(format!(
                "shallow_depth {} leaves no deep band below sky_height {} in a grid {} rows tall",
                self.shallow_depth, self.sky_height, self.height
            )));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(WorldError::InvalidConfig(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.window_margin.is_finite() && self.window_margin >= 1.0) {
            return Err(WorldError::InvalidConfig(format!(
                "window_margin must be at least 1.0, got {}",
                self.window_margin
            )));
        }
        self.special_areas().map(|_| ())
    }

    /// First row of the deep band.
    #[must_use]
    pub const fn shallow_end(&self) -> u32 {
        self.sky_height.saturating_add(self.shallow_depth)
    }

    /// Grid dimensions and scale.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.width, self.height, self.tile_size)
    }

    /// Builds the overlay list: explicit areas if configured, otherwise the
    /// built-in set.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::InvalidSpecialArea` for a malformed area or one
    /// that does not fit in the grid.
    pub fn special_areas(&self) -> WorldResult<Vec<SpecialArea>> {
        let Some(configured) = &self.special_areas else {
            return Ok(SpecialArea::default_set(self.width, self.height, self.shallow_end()));
        };

        configured
            .iter()
            .map(|area| {
                let built = SpecialArea::new(area.x, area.y, &area.rows)?;
                if built.fits(self.width, self.height) {
                    Ok(built)
                } else {
                    Err(WorldError::InvalidSpecialArea {
                        x: area.x,
                        y: area.y,
                        reason: format!("does not fit in {}x{} grid", self.width, self.height),
                    })
                }
            })
            .collect()
    }
}
