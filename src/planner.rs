//! Grid runs: walk the tile grid row by row and build each tile.
//!
//! Tiles are built one at a time in row-major order. The first tile that
//! cannot be resolved, loaded or exported cancels the run; tiles finished
//! before it are left as they are (files on disk, objects in the scene).

use std::path::{Path, PathBuf};

use crate::builder::{build_displaced_plane, DisplacementSettings};
use crate::config::{GridConfig, RenderConfig, SolidConfig};
use crate::error::TileError;
use crate::paths::{resolve_optional_path, resolve_path, TileCoordinate, TileFileSet};
use crate::raster::RasterSource;
use crate::render::finish_for_render;
use crate::report::Reporter;
use crate::scene::{Scene, SceneObject};
use crate::solid::{export_solid, finish_for_solid, EXPORT_SCALE};

/// How a grid run ended.
#[derive(Debug)]
pub enum GridOutcome {
    Finished { tiles: u32 },
    Cancelled {
        tile: TileCoordinate,
        error: TileError,
        tiles_built: u32,
    },
}

impl GridOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, GridOutcome::Finished { .. })
    }

    pub fn tiles_built(&self) -> u32 {
        match self {
            GridOutcome::Finished { tiles } => *tiles,
            GridOutcome::Cancelled { tiles_built, .. } => *tiles_built,
        }
    }
}

/// Grid cells in build order: (0,0), (0,1), ..., (1,0), ...
pub fn tile_order(rows: u32, cols: u32) -> impl Iterator<Item = TileCoordinate> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| TileCoordinate::new(row, col)))
}

/// Optional start files for texture and roughness (render mode only).
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionalInputs<'a> {
    pub texture: Option<&'a Path>,
    pub roughness: Option<&'a Path>,
}

/// Work out the files for one tile.
///
/// A single-tile grid uses the configured paths as given. Otherwise the
/// heightmap must resolve; an optional input that cannot be resolved is
/// reported and left out.
pub fn resolve_tile_files(
    grid: &GridConfig,
    optional: OptionalInputs<'_>,
    coord: TileCoordinate,
    reporter: &mut Reporter,
) -> Result<TileFileSet, TileError> {
    if grid.is_single_tile() {
        return Ok(TileFileSet::literal(&grid.heightmap, optional.texture, optional.roughness));
    }

    let (row, col) = (coord.row as i64, coord.col as i64);
    let heightmap = resolve_path(&grid.heightmap, row, col)?;
    let mut optional_path = |base: Option<&Path>, label: &str| -> Option<PathBuf> {
        match resolve_optional_path(base, row, col) {
            Ok(path) => path,
            Err(e) => {
                reporter.error(format!("Skipping {} for tile {}: {}", label, coord, e));
                None
            }
        }
    };
    let texture = optional_path(optional.texture, "texture");
    let roughness = optional_path(optional.roughness, "roughness map");

    Ok(TileFileSet { heightmap, texture, roughness })
}

/// Drive `build` over every tile of the grid, stopping at the first error.
pub fn run_grid<F>(
    grid: &GridConfig,
    optional: OptionalInputs<'_>,
    reporter: &mut Reporter,
    mut build: F,
) -> GridOutcome
where
    F: FnMut(TileCoordinate, &TileFileSet, &mut Reporter) -> Result<(), TileError>,
{
    let mut built = 0;

    for coord in tile_order(grid.rows, grid.cols) {
        let result = resolve_tile_files(grid, optional, coord, reporter)
            .and_then(|files| build(coord, &files, reporter));

        if let Err(error) = result {
            match &error {
                TileError::RasterLoad(e) => {
                    reporter.warning(format!("Failed to load image: {}", e.path().display()))
                }
                other => reporter.error(other.to_string()),
            }
            reporter.error(format!(
                "Cancelled at tile {} after {} of {} tiles",
                coord,
                built,
                grid.tile_count()
            ));
            return GridOutcome::Cancelled { tile: coord, error, tiles_built: built };
        }
        built += 1;
    }

    GridOutcome::Finished { tiles: built }
}

fn displacement(grid: &GridConfig) -> DisplacementSettings {
    DisplacementSettings {
        strength: grid.displacement_strength,
        subdivision_levels: grid.subdivision_levels,
    }
}

/// Build every tile as a closed solid and write one STL file per tile.
pub fn generate_solid_tiles<S: RasterSource + ?Sized>(
    config: &SolidConfig,
    source: &mut S,
    reporter: &mut Reporter,
) -> GridOutcome {
    let grid = &config.grid;
    let settings = displacement(grid);

    run_grid(grid, OptionalInputs::default(), reporter, |coord, files, reporter| {
        let heightmap = source.load(&files.heightmap)?;
        let name = format!("Tile_{}_{}", coord.row, coord.col);

        let plane = build_displaced_plane(&name, heightmap, settings, config.tile_thickness, true);
        let solid = finish_for_solid(plane, config.tile_thickness);
        let path = export_solid(solid, &config.output_dir, &files.heightmap, EXPORT_SCALE)?;

        reporter.info(format!("STL generated: {}", path.display()));
        Ok(())
    })
}

/// Build every tile with live displacement and a material, and leave it in `scene`.
pub fn generate_render_tiles<S: RasterSource + ?Sized>(
    config: &RenderConfig,
    source: &mut S,
    scene: &mut Scene,
    reporter: &mut Reporter,
) -> GridOutcome {
    let grid = &config.grid;
    let settings = displacement(grid);
    let optional = OptionalInputs {
        texture: config.texture.as_deref(),
        roughness: config.roughness.as_deref(),
    };

    run_grid(grid, optional, reporter, |coord, files, reporter| {
        let heightmap = source.load(&files.heightmap)?;
        let name = format!("Tile_{}_{}", coord.row, coord.col);

        let plane = build_displaced_plane(&name, heightmap, settings, 0.0, false);
        let mesh = finish_for_render(plane, coord, files, config.invert_roughness, &mut *source, reporter);

        scene.add(SceneObject {
            coordinate: coord,
            heightmap: files.heightmap.clone(),
            mesh,
        });
        Ok(())
    })
}
