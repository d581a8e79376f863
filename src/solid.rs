//! Printable solid tiles: closing a displaced plane and writing it as STL.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::TileError;
use crate::mesh::TileMesh;
use crate::stl;

/// Uniform scale applied when writing STL files.
pub const EXPORT_SCALE: f32 = 10.0;

/// Turn a displaced plane into a closed solid with a flat base at Z = 0.
///
/// The surface is extruded `2 * thickness` straight down, the extruded copy is
/// flattened onto Z = 0 and any top vertex below Z = 0 is lifted onto it. The
/// base is flat for every displacement strength. Where the top surface sits
/// at or above `thickness` the tile is at least `thickness` thick; top
/// vertices that were displaced below zero end up on the base plane.
pub fn finish_for_solid(mut mesh: TileMesh, thickness: f32) -> TileMesh {
    if !mesh.modifiers.is_empty() {
        mesh.apply_modifiers();
    }
    mesh.apply_transform(true, true);

    let surface_vertices = mesh.vertex_count();
    mesh.extrude_all(Vec3::new(0.0, 0.0, -2.0 * thickness));
    for p in &mut mesh.positions[surface_vertices..] {
        p.z = 0.0;
    }
    mesh.clamp_z_below(0.0);

    let flipped = mesh.make_normals_consistent();
    log::debug!(
        "{}: solid has {} faces, {} flipped for outward normals",
        mesh.name,
        mesh.face_count(),
        flipped
    );
    mesh
}

/// Output path for a tile: the heightmap's file name with an `.stl` extension.
pub fn solid_output_path(output_dir: &Path, heightmap: &Path) -> PathBuf {
    let stem = heightmap
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tile".to_string());
    output_dir.join(format!("{}.stl", stem))
}

/// Write the solid to `output_dir` and drop it. The file is all that remains.
pub fn export_solid(
    mesh: TileMesh,
    output_dir: &Path,
    heightmap: &Path,
    scale: f32,
) -> Result<PathBuf, TileError> {
    let path = solid_output_path(output_dir, heightmap);
    let export_err = |source| TileError::Export { path: path.clone(), source };

    fs::create_dir_all(output_dir).map_err(export_err)?;
    let file = File::create(&path).map_err(export_err)?;
    let header = format!("heightmap_tiles {}", mesh.name);
    stl::write_binary_stl(BufWriter::new(file), &mesh, &header, scale).map_err(export_err)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_displaced_plane, DisplacementSettings};
    use crate::pixel_grid::PixelGrid;
    use crate::raster::{Raster, RasterHandle};
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Diagonal gradient from black to white.
    fn gradient() -> RasterHandle {
        let size = 8;
        let data = (0..size * size)
            .map(|i| ((i % size) + (i / size)) as f32 / (2 * (size - 1)) as f32)
            .collect();
        let grid = PixelGrid::from_vec(size, size, data).unwrap();
        Arc::new(Raster::from_grid(Path::new("g_y0_x0.png"), grid))
    }

    fn solid(strength: f32, thickness: f32) -> TileMesh {
        let settings = DisplacementSettings { strength, subdivision_levels: 0 };
        let plane = build_displaced_plane("g", gradient(), settings, thickness, true);
        finish_for_solid(plane, thickness)
    }

    #[test]
    fn test_solid_is_closed_and_outward() {
        let mesh = solid(1.0, 1.0);
        assert_eq!(mesh.non_manifold_edges(), 0);
        assert!(mesh.boundary_edges().is_empty());
        assert_eq!(mesh.location, Vec3::ZERO);
        // Top faces come first and must point up.
        assert!(mesh.face_normal(&mesh.faces[0]).z > 0.0);
    }

    #[test]
    fn test_base_is_flat_at_zero() {
        let mesh = solid(0.5, 1.0);
        let (min, max) = mesh.world_bounds().unwrap();
        assert!(min.z.abs() < 1e-5);
        assert!((max.z - 1.5).abs() < 1e-3);
        // Every extruded vertex lands on the base: top is at most 1.5, pushed down by 2.
        let half = mesh.vertex_count() / 2;
        assert!(mesh.positions[half..].iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_base_is_flat_when_relief_exceeds_thickness() {
        let flat = Arc::new(Raster::from_grid(Path::new("f_y0_x0.png"), PixelGrid::new_with(4, 4, 1.0)));
        let settings = DisplacementSettings { strength: 5.0, subdivision_levels: 0 };
        let plane = build_displaced_plane("f", flat, settings, 1.0, true);
        let surface_vertices = plane.vertex_count();
        let mesh = finish_for_solid(plane, 1.0);

        assert!(mesh.positions[surface_vertices..].iter().all(|p| p.z == 0.0));
        let (min, max) = mesh.world_bounds().unwrap();
        assert_eq!(min.z, 0.0);
        assert!((max.z - 6.0).abs() < 1e-4);
        assert_eq!(mesh.non_manifold_edges(), 0);
        assert!(mesh.face_normal(&mesh.faces[0]).z > 0.0);
    }

    #[test]
    fn test_no_vertex_below_zero_for_any_strength() {
        for strength in [-50.0, -5.0, 0.0, 3.0, 40.0] {
            let mesh = solid(strength, 0.2);
            assert!(
                mesh.positions.iter().all(|p| p.z >= 0.0),
                "vertex below zero at strength {}",
                strength
            );
        }
    }

    #[test]
    fn test_export_writes_scaled_stl_named_after_heightmap() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("stl");
        let mesh = solid(1.0, 1.0);
        let triangles = mesh.face_count() * 2;

        let path = export_solid(mesh, &out, Path::new("/in/Height_y3_x4.png"), EXPORT_SCALE).unwrap();
        assert_eq!(path, out.join("Height_y3_x4.stl"));

        let (_, tris) = stl::read_binary_stl(File::open(&path).unwrap()).unwrap();
        assert_eq!(tris.len(), triangles);
        let max_x = tris
            .iter()
            .flat_map(|t| t.vertices)
            .map(|v| v.x)
            .fold(f32::MIN, f32::max);
        assert!((max_x - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        let result = export_solid(solid(1.0, 1.0), &blocker, Path::new("h_y0_x0.png"), EXPORT_SCALE);
        assert!(matches!(result, Err(TileError::Export { .. })));
    }

    #[test]
    fn test_output_path() {
        let path = solid_output_path(Path::new("out"), Path::new("a/b/Height_y0_x1.r16"));
        assert_eq!(path, PathBuf::from("out/Height_y0_x1.stl"));
    }
}
