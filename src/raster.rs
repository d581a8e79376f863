//! Raster loading for heightmaps, textures and roughness maps.
//!
//! Rasters are decoded once, reduced to a single intensity channel and shared
//! through reference-counted handles. Nothing in the pipeline frees them
//! explicitly; a handle lives as long as the last mesh modifier or material
//! that points at it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use image::{DynamicImage, ImageError, ImageReader};

use crate::error::RasterError;
use crate::pixel_grid::PixelGrid;

/// A decoded raster, stored as per-pixel intensity in [0, 1].
#[derive(Debug)]
pub struct Raster {
    pub path: PathBuf,
    intensity: PixelGrid<f32>,
}

/// Shared handle to a loaded raster.
pub type RasterHandle = Arc<Raster>;

impl Raster {
    /// Intensity is the mean of the RGB channels; alpha is ignored.
    pub fn from_image(path: &Path, image: &DynamicImage) -> Self {
        let rgb = image.to_rgb32f();
        let (width, height) = rgb.dimensions();
        let mut intensity = PixelGrid::new(width as usize, height as usize);
        for (x, y, p) in rgb.enumerate_pixels() {
            intensity.set(x as usize, y as usize, (p.0[0] + p.0[1] + p.0[2]) / 3.0);
        }
        Self { path: path.to_path_buf(), intensity }
    }

    pub fn from_grid(path: &Path, intensity: PixelGrid<f32>) -> Self {
        Self { path: path.to_path_buf(), intensity }
    }

    pub fn width(&self) -> usize {
        self.intensity.width
    }

    pub fn height(&self) -> usize {
        self.intensity.height
    }

    pub fn intensity(&self) -> &PixelGrid<f32> {
        &self.intensity
    }

    /// Sample intensity at a texture coordinate.
    ///
    /// UV (0, 0) is the bottom-left of the image and (1, 1) the top-right.
    /// Coordinates outside [0, 1] extend the edge pixels.
    pub fn sample_uv(&self, u: f32, v: f32) -> f32 {
        if self.intensity.width == 0 || self.intensity.height == 0 {
            return 0.0;
        }
        let x = u * self.intensity.width as f32;
        let y = (1.0 - v) * self.intensity.height as f32;
        self.intensity.sample_bilinear(x, y)
    }
}

/// Where rasters come from. The tile pipeline only ever asks for a path.
pub trait RasterSource {
    fn load(&mut self, path: &Path) -> Result<RasterHandle, RasterError>;
}

/// Loads rasters from disk with the `image` crate.
///
/// A path loaded twice returns the same handle while any user still holds it.
/// The loader keeps only weak references, so a raster is freed as soon as the
/// last mesh or material using it is dropped.
#[derive(Default)]
pub struct ImageLoader {
    cache: HashMap<PathBuf, Weak<Raster>>,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rasters that are still alive.
    pub fn cached(&self) -> usize {
        self.cache.values().filter(|w| w.strong_count() > 0).count()
    }
}

impl RasterSource for ImageLoader {
    fn load(&mut self, path: &Path) -> Result<RasterHandle, RasterError> {
        if let Some(handle) = self.cache.get(path).and_then(Weak::upgrade) {
            return Ok(handle);
        }

        let image = decode_image(path)?;
        let handle = Arc::new(Raster::from_image(path, &image));
        log::debug!(
            "loaded raster {} ({}x{})",
            path.display(),
            handle.width(),
            handle.height()
        );
        self.cache.retain(|_, w| w.strong_count() > 0);
        self.cache.insert(path.to_path_buf(), Arc::downgrade(&handle));
        Ok(handle)
    }
}

fn decode_image(path: &Path) -> Result<DynamicImage, RasterError> {
    let io_err = |source| RasterError::Io { path: path.to_path_buf(), source };

    let reader = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?;

    reader.decode().map_err(|e| match e {
        ImageError::IoError(source) => RasterError::Io { path: path.to_path_buf(), source },
        other => RasterError::Decode { path: path.to_path_buf(), source: other },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_sample_uv_orientation() {
        // Top row bright, bottom row dark.
        let grid = PixelGrid::from_vec(1, 2, vec![1.0f32, 0.0]).unwrap();
        let raster = Raster::from_grid(Path::new("mem"), grid);
        assert!((raster.sample_uv(0.5, 1.0) - 1.0).abs() < 1e-6);
        assert!((raster.sample_uv(0.5, 0.0) - 0.0).abs() < 1e-6);
        assert!((raster.sample_uv(0.5, 0.5) - 0.5).abs() < 1e-6);
        // Extend past the edges.
        assert!((raster.sample_uv(-1.0, 2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_png_and_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("h_y0_x0.png");
        let mut img = GrayImage::new(4, 4);
        for (x, _, p) in img.enumerate_pixels_mut() {
            *p = Luma([(x * 85) as u8]);
        }
        img.save(&path).unwrap();

        let mut loader = ImageLoader::new();
        let first = loader.load(&path).unwrap();
        let second = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached(), 1);
        assert_eq!((first.width(), first.height()), (4, 4));
        assert!((*first.intensity().get(3, 0) - 1.0).abs() < 1e-6);
        assert!((*first.intensity().get(0, 2)).abs() < 1e-6);
    }

    #[test]
    fn test_dropped_rasters_are_freed() {
        let dir = tempdir().unwrap();
        let mut loader = ImageLoader::new();
        let mut watchers = Vec::new();
        for x in 0..5 {
            let path = dir.path().join(format!("h_y0_x{}.png", x));
            GrayImage::from_pixel(2, 2, Luma([40])).save(&path).unwrap();
            let handle = loader.load(&path).unwrap();
            watchers.push(Arc::downgrade(&handle));
        }

        assert_eq!(loader.cached(), 0);
        assert!(watchers.iter().all(|w| w.upgrade().is_none()));

        // A held handle is still shared; a reload after dropping decodes afresh.
        let path = dir.path().join("h_y0_x0.png");
        let held = loader.load(&path).unwrap();
        assert!(Arc::ptr_eq(&held, &loader.load(&path).unwrap()));
        assert_eq!(loader.cached(), 1);
        drop(held);
        assert_eq!(loader.cached(), 0);
    }

    #[test]
    fn test_from_image_is_mean_rgb() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([255, 255, 255]));
        let raster = Raster::from_image(Path::new("mem"), &DynamicImage::ImageRgb8(img));
        assert_eq!((raster.width(), raster.height()), (2, 1));
        assert!((*raster.intensity().get(0, 0) - 1.0 / 3.0).abs() < 1e-6);
        assert!((*raster.intensity().get(1, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let mut loader = ImageLoader::new();
        let err = loader.load(&dir.path().join("absent_y0_x0.png")).unwrap_err();
        assert!(matches!(err, RasterError::Io { .. }));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken_y0_x0.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let mut loader = ImageLoader::new();
        let err = loader.load(&path).unwrap_err();
        assert!(matches!(err, RasterError::Decode { .. }), "got {:?}", err);
        assert_eq!(err.kind(), "decode");
    }
}
