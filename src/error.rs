//! Error types for tile generation.
//!
//! Required-input failures (`TileError`) cancel a whole grid run. Optional-input
//! failures surface as `RasterError` values that the render path reports and drops.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to load a raster from disk, split by where it went wrong.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The file could not be opened or read.
    #[error("cannot read image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file was read but is not a decodable image.
    #[error("cannot decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RasterError {
    pub fn path(&self) -> &Path {
        match self {
            RasterError::Io { path, .. } | RasterError::Decode { path, .. } => path,
        }
    }

    /// Short label for status messages ("I/O" or "decode").
    pub fn kind(&self) -> &'static str {
        match self {
            RasterError::Io { .. } => "I/O",
            RasterError::Decode { .. } => "decode",
        }
    }
}

/// Anything that stops a tile from being built.
#[derive(Error, Debug)]
pub enum TileError {
    #[error("filename does not encode grid coordinates '_y<Y>_x<X>': {}", path.display())]
    PatternMismatch { path: PathBuf },

    #[error("grid coordinate y={y} x={x} is negative for {}", path.display())]
    NegativeCoordinate { path: PathBuf, y: i64, x: i64 },

    #[error("grid coordinate does not fit in 64 bits for {}", path.display())]
    CoordinateOverflow { path: PathBuf },

    #[error(transparent)]
    RasterLoad(#[from] RasterError),

    #[error("failed to export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Settings that cannot start a run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be at least 1 (got {value})")]
    GridTooSmall { field: &'static str, value: u32 },

    #[error("tile thickness must be a positive number (got {0})")]
    Thickness(f32),

    #[error("displacement strength must be finite (got {0})")]
    Strength(f32),

    #[error("no {0} was configured")]
    MissingPath(&'static str),

    #[error("cannot read settings file {}: {source}", path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_error_kind() {
        let err = RasterError::Io {
            path: PathBuf::from("a_y0_x0.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.kind(), "I/O");
        assert_eq!(err.path(), Path::new("a_y0_x0.png"));

        let tile: TileError = err.into();
        assert!(matches!(tile, TileError::RasterLoad(RasterError::Io { .. })));
        assert!(tile.to_string().contains("a_y0_x0.png"));
    }

    #[test]
    fn test_pattern_mismatch_message() {
        let err = TileError::PatternMismatch { path: PathBuf::from("flat.png") };
        assert!(err.to_string().contains("does not encode grid coordinates"));
    }
}
