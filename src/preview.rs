//! Top-down preview images of finished tiles.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::mesh::TileMesh;
use crate::pixel_grid::PixelGrid;

/// Rasterise the highest world Z of the mesh into a `resolution` square grid.
/// Row 0 is the +Y edge of the tile.
///
/// Pixels that no vertex falls into take the lowest height found.
pub fn surface_heights(mesh: &TileMesh, resolution: usize) -> PixelGrid<f32> {
    let resolution = resolution.max(2);
    let mut heights = PixelGrid::new_with(resolution, resolution, f32::NAN);
    let Some((min, max)) = mesh.world_bounds() else {
        return PixelGrid::new(resolution, resolution);
    };
    let span_x = (max.x - min.x).max(f32::EPSILON);
    let span_y = (max.y - min.y).max(f32::EPSILON);
    let last = (resolution - 1) as f32;

    for i in 0..mesh.vertex_count() {
        let p = mesh.world_position(i);
        let px = (((p.x - min.x) / span_x) * last).round() as usize;
        let py = (((max.y - p.y) / span_y) * last).round() as usize;
        let current = *heights.get(px, py);
        if current.is_nan() || p.z > current {
            heights.set(px, py, p.z);
        }
    }

    let floor = min.z;
    for y in 0..resolution {
        for x in 0..resolution {
            if heights.get(x, y).is_nan() {
                heights.set(x, y, floor);
            }
        }
    }
    heights
}

/// Colour heights with a spectral ramp, lightly hill-shaded.
pub fn shade_heights(heights: &PixelGrid<f32>) -> RgbImage {
    let (min_h, max_h) = heights.range();
    let range = (max_h - min_h).max(f32::EPSILON);
    let width = heights.width;
    let height = heights.height;
    let mut img: RgbImage = ImageBuffer::new(width as u32, height as u32);

    for y in 0..height {
        for x in 0..width {
            let h = *heights.get(x, y);
            let base = spectral_colormap((h - min_h) / range);

            let mut shade = 1.0f32;
            if x >= 1 && y >= 1 && x < width - 1 && y < height - 1 {
                let slope_x = (*heights.get(x + 1, y) - *heights.get(x - 1, y)) / range;
                let slope_y = (*heights.get(x, y + 1) - *heights.get(x, y - 1)) / range;
                shade = (1.0 + slope_x * 3.0 - slope_y * 2.0).clamp(0.7, 1.3);
            }

            let channel = |c: u8| ((c as f32 * shade).min(255.0)) as u8;
            img.put_pixel(x as u32, y as u32, Rgb([channel(base[0]), channel(base[1]), channel(base[2])]));
        }
    }

    img
}

/// Spectral colormap: dark blue (low) through yellow to dark red (high).
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t.clamp(0.0, 1.0) * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

/// Write a shaded top-down preview of `mesh` as an image file.
pub fn export_preview(mesh: &TileMesh, resolution: usize, path: &str) -> Result<(), image::ImageError> {
    shade_heights(&surface_heights(mesh, resolution)).save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_surface_heights_of_tilted_plane() {
        let mut plane = TileMesh::plane("p", 10.0, Vec3::ZERO);
        plane.subdivide(9);
        for p in &mut plane.positions {
            p.z = p.y + 5.0;
        }
        let heights = surface_heights(&plane, 11);
        // Top row is +Y, the high edge.
        assert!((*heights.get(5, 0) - 10.0).abs() < 1e-4);
        assert!(heights.get(5, 10).abs() < 1e-4);
        assert!(heights.iter().all(|(_, _, h)| !h.is_nan()));
    }

    #[test]
    fn test_shade_heights_dimensions() {
        let heights = PixelGrid::from_vec(3, 2, vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let img = shade_heights(&heights);
        assert_eq!(img.dimensions(), (3, 2));
        assert_ne!(img.get_pixel(0, 0), img.get_pixel(2, 1));
    }

    #[test]
    fn test_colormap_ends() {
        assert_eq!(spectral_colormap(0.0), [94, 79, 163]);
        assert_eq!(spectral_colormap(-1.0), spectral_colormap(0.0));
        assert_eq!(spectral_colormap(2.0), spectral_colormap(1.0));
    }
}
