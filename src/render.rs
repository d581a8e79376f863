//! Render tiles: material assignment and grid placement.

use std::path::Path;

use glam::Vec3;

use crate::builder::TILE_SIZE;
use crate::material::build_tile_material;
use crate::mesh::TileMesh;
use crate::paths::{TileCoordinate, TileFileSet};
use crate::raster::{RasterHandle, RasterSource};
use crate::report::Reporter;

/// World position of a tile: columns run along +X, rows along -Y.
pub fn tile_location(coord: TileCoordinate) -> Vec3 {
    Vec3::new(
        coord.col as f32 * TILE_SIZE,
        -(coord.row as f32) * TILE_SIZE,
        0.0,
    )
}

/// Attach the tile material and move the mesh to its grid position.
///
/// Texture and roughness rasters are optional. If one fails to load, the
/// failure is reported and that material input is left unconnected; the tile
/// is still finished.
pub fn finish_for_render<S: RasterSource + ?Sized>(
    mut mesh: TileMesh,
    coord: TileCoordinate,
    files: &TileFileSet,
    invert_roughness: bool,
    source: &mut S,
    reporter: &mut Reporter,
) -> TileMesh {
    let texture = load_optional(source, files.texture.as_deref(), "texture", reporter);
    let roughness = load_optional(source, files.roughness.as_deref(), "roughness map", reporter);

    mesh.material = Some(build_tile_material(coord, texture, roughness, invert_roughness));
    mesh.location = tile_location(coord);
    mesh
}

fn load_optional<S: RasterSource + ?Sized>(
    source: &mut S,
    path: Option<&Path>,
    label: &str,
    reporter: &mut Reporter,
) -> Option<RasterHandle> {
    let path = path?;
    match source.load(path) {
        Ok(raster) => {
            reporter.info(format!("Successfully loaded {}: {}", label, path.display()));
            Some(raster)
        }
        Err(e) => {
            reporter.error(format!(
                "Failed to load {} ({} error): {}",
                label,
                e.kind(),
                path.display()
            ));
            None
        }
    }
}
