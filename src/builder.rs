//! Displaced terrain planes.

use glam::Vec3;

use crate::mesh::{Displace, Modifier, TileMesh};
use crate::raster::RasterHandle;

/// World-space edge length of every tile.
pub const TILE_SIZE: f32 = 10.0;

/// Cuts applied to the base plane before the subdivision modifier, giving a
/// 101 x 101 quad grid regardless of the configured subdivision levels.
pub const PLANE_CUTS: u32 = 100;

/// How a heightmap is turned into relief.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplacementSettings {
    pub strength: f32,
    pub subdivision_levels: u32,
}

/// Build a `TILE_SIZE` square plane at height `base_height`, densely
/// subdivided and displaced by `heightmap`.
///
/// With `bake` the modifiers are collapsed into the geometry straight away;
/// otherwise they stay live on the mesh and are evaluated on demand.
pub fn build_displaced_plane(
    name: &str,
    heightmap: RasterHandle,
    settings: DisplacementSettings,
    base_height: f32,
    bake: bool,
) -> TileMesh {
    let mut plane = TileMesh::plane(name, 1.0, Vec3::new(0.0, 0.0, base_height));
    plane.resize(Vec3::splat(TILE_SIZE));
    plane.subdivide(PLANE_CUTS);
    plane.apply_transform(false, true);

    plane.add_modifier(Modifier::SimpleSubdivision { levels: settings.subdivision_levels });
    plane.add_modifier(Modifier::Displace(Displace {
        raster: heightmap,
        strength: settings.strength,
        mid_level: 0.0,
    }));

    if bake {
        plane.apply_modifiers();
    }
    plane
}
