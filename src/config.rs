//! Tile generation settings.
//!
//! `TileSettings` is the editable set of options (from a JSON file and/or the
//! command line). It is validated once into an immutable `SolidConfig` or
//! `RenderConfig` before a grid run starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// All options, as a user edits them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSettings {
    /// Number of rows in the tile grid (1 for a single heightmap)
    pub rows: u32,
    /// Number of columns in the tile grid (1 for a single heightmap)
    pub cols: u32,
    pub displacement_strength: f32,
    /// Levels of simple subdivision applied before displacement
    pub subdivision_levels: u32,
    /// First heightmap of the set, e.g. `Height_y0_x0.png`
    pub heightmap: PathBuf,

    // Solid (STL) output
    pub tile_thickness: f32,
    pub output_dir: PathBuf,

    // Render output
    pub texture: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
    pub invert_roughness: bool,
}

impl Default for TileSettings {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            displacement_strength: 1.0,
            subdivision_levels: 3,
            heightmap: PathBuf::new(),
            tile_thickness: 1.0,
            output_dir: PathBuf::new(),
            texture: None,
            roughness: None,
            invert_roughness: false,
        }
    }
}

impl TileSettings {
    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn grid_config(&self) -> Result<GridConfig, ConfigError> {
        if self.rows < 1 {
            return Err(ConfigError::GridTooSmall { field: "rows", value: self.rows });
        }
        if self.cols < 1 {
            return Err(ConfigError::GridTooSmall { field: "cols", value: self.cols });
        }
        if !self.displacement_strength.is_finite() {
            return Err(ConfigError::Strength(self.displacement_strength));
        }
        if self.heightmap.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("heightmap file"));
        }

        Ok(GridConfig {
            rows: self.rows,
            cols: self.cols,
            displacement_strength: self.displacement_strength,
            subdivision_levels: self.subdivision_levels,
            heightmap: self.heightmap.clone(),
        })
    }

    pub fn solid_config(&self) -> Result<SolidConfig, ConfigError> {
        let grid = self.grid_config()?;
        if !(self.tile_thickness.is_finite() && self.tile_thickness > 0.0) {
            return Err(ConfigError::Thickness(self.tile_thickness));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("output directory"));
        }

        Ok(SolidConfig {
            grid,
            tile_thickness: self.tile_thickness,
            output_dir: self.output_dir.clone(),
        })
    }

    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        let non_empty = |p: &Option<PathBuf>| p.clone().filter(|p| !p.as_os_str().is_empty());
        Ok(RenderConfig {
            grid: self.grid_config()?,
            texture: non_empty(&self.texture),
            roughness: non_empty(&self.roughness),
            invert_roughness: self.invert_roughness,
        })
    }
}

/// Options shared by both output modes.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub displacement_strength: f32,
    pub subdivision_levels: u32,
    pub heightmap: PathBuf,
}

impl GridConfig {
    /// One tile: the configured paths are used verbatim.
    pub fn is_single_tile(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    pub fn tile_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolidConfig {
    pub grid: GridConfig,
    pub tile_thickness: f32,
    pub output_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub grid: GridConfig,
    pub texture: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
    pub invert_roughness: bool,
}
