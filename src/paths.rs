//! Tile filename resolution.
//!
//! Tile sets are addressed purely by filename: every file of a set carries a
//! `_y<Y>_x<X>` suffix in its stem, e.g. `terrain_y2_x5.png`. Given the first
//! file of a set and a (row, col) offset, the sibling file for that grid cell is
//! `terrain_y<2+row>_x<5+col>.png` in the same directory.

use std::path::{Path, PathBuf};

use crate::error::TileError;

/// Zero-based offset of a tile from the start tile of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoordinate {
    pub row: u32,
    pub col: u32,
}

impl TileCoordinate {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A filename stem split around its grid coordinate suffix.
///
/// The suffix is `y<digits>_x<digits>`, either at the very start of the stem
/// (empty prefix) or directly after an underscore. Matching is leftmost, and
/// anything after the suffix is not part of the addressing scheme: it is
/// dropped when a sibling name is rebuilt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinateStem<'a> {
    /// Everything before the `y`, including the separating underscore.
    pub head: &'a str,
    pub y: &'a str,
    pub x: &'a str,
}

impl<'a> CoordinateStem<'a> {
    pub fn parse(stem: &'a str) -> Option<Self> {
        let bytes = stem.as_bytes();

        for (at, _) in stem.match_indices('y') {
            let marker = at == 0 || bytes[at - 1] == b'_';
            if !marker {
                continue;
            }
            if let Some((y_end, x_start, x_end)) = match_suffix(bytes, at + 1) {
                return Some(Self {
                    head: &stem[..at],
                    y: &stem[at + 1..y_end],
                    x: &stem[x_start..x_end],
                });
            }
        }

        None
    }

    /// Rebuild a stem with the same prefix and new coordinates.
    pub fn with_coordinates(&self, y: i64, x: i64) -> String {
        format!("{}y{}_x{}", self.head, y, x)
    }
}

/// Match `<digits>_x<digits>` at `pos`; returns (end of y digits, start of x digits, end of x digits).
fn match_suffix(bytes: &[u8], pos: usize) -> Option<(usize, usize, usize)> {
    let y_end = digits_end(bytes, pos);
    if y_end == pos || !bytes[y_end..].starts_with(b"_x") {
        return None;
    }
    let x_start = y_end + 2;
    let x_end = digits_end(bytes, x_start);
    if x_end == x_start {
        return None;
    }
    Some((y_end, x_start, x_end))
}

fn digits_end(bytes: &[u8], pos: usize) -> usize {
    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

/// Derive the path of the tile at (`row_offset`, `col_offset`) from the start tile path.
///
/// Absolute coordinates that come out negative are rejected instead of being
/// written into the filename with a sign.
pub fn resolve_path(base: &Path, row_offset: i64, col_offset: i64) -> Result<PathBuf, TileError> {
    let mismatch = || TileError::PatternMismatch { path: base.to_path_buf() };

    let stem = base.file_stem().and_then(|s| s.to_str()).ok_or_else(mismatch)?;
    let extension = match base.extension() {
        Some(ext) => format!(".{}", ext.to_str().ok_or_else(mismatch)?),
        None => String::new(),
    };
    let parsed = CoordinateStem::parse(stem).ok_or_else(mismatch)?;

    let overflow = || TileError::CoordinateOverflow { path: base.to_path_buf() };
    let start_y: i64 = parsed.y.parse().map_err(|_| overflow())?;
    let start_x: i64 = parsed.x.parse().map_err(|_| overflow())?;
    let y = start_y.checked_add(row_offset).ok_or_else(overflow)?;
    let x = start_x.checked_add(col_offset).ok_or_else(overflow)?;

    if y < 0 || x < 0 {
        return Err(TileError::NegativeCoordinate { path: base.to_path_buf(), y, x });
    }

    let filename = format!("{}{}", parsed.with_coordinates(y, x), extension);
    Ok(match base.parent() {
        Some(dir) => dir.join(filename),
        None => PathBuf::from(filename),
    })
}

/// Like [`resolve_path`], but an unset or empty start path means "no file" rather than an error.
pub fn resolve_optional_path(
    base: Option<&Path>,
    row_offset: i64,
    col_offset: i64,
) -> Result<Option<PathBuf>, TileError> {
    match base {
        Some(path) if !path.as_os_str().is_empty() => {
            resolve_path(path, row_offset, col_offset).map(Some)
        }
        _ => Ok(None),
    }
}

/// The input files backing one grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileFileSet {
    pub heightmap: PathBuf,
    pub texture: Option<PathBuf>,
    pub roughness: Option<PathBuf>,
}

impl TileFileSet {
    /// Use the configured paths as they are (single-tile mode).
    pub fn literal(heightmap: &Path, texture: Option<&Path>, roughness: Option<&Path>) -> Self {
        let non_empty = |p: Option<&Path>| p.filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf);
        Self {
            heightmap: heightmap.to_path_buf(),
            texture: non_empty(texture),
            roughness: non_empty(roughness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_offsets_both_axes() {
        let resolved = resolve_path(Path::new("terrain_y2_x5.png"), 1, 3).unwrap();
        assert_eq!(resolved, PathBuf::from("terrain_y3_x8.png"));
    }

    #[test]
    fn test_resolve_empty_prefix_identity() {
        let resolved = resolve_path(Path::new("y0_x0.png"), 0, 0).unwrap();
        assert_eq!(resolved, PathBuf::from("y0_x0.png"));

        let resolved = resolve_path(Path::new("y0_x0.png"), 2, 1).unwrap();
        assert_eq!(resolved, PathBuf::from("y2_x1.png"));

        let resolved = resolve_path(Path::new("_y0_x0.png"), 0, 3).unwrap();
        assert_eq!(resolved, PathBuf::from("_y0_x3.png"));
    }

    #[test]
    fn test_resolve_keeps_directory_and_extension() {
        let base = Path::new("/data/gaea/out/Height_y0_x0.r16");
        let resolved = resolve_path(base, 2, 1).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/gaea/out/Height_y2_x1.r16"));
    }

    #[test]
    fn test_resolve_no_extension() {
        let resolved = resolve_path(Path::new("tiles/h_y1_x1"), 0, 4).unwrap();
        assert_eq!(resolved, PathBuf::from("tiles/h_y1_x5"));
    }

    #[test]
    fn test_resolve_without_suffix_fails_for_any_offset() {
        for (row, col) in [(0, 0), (1, 0), (0, 7), (3, 3)] {
            let result = resolve_path(Path::new("flat.png"), row, col);
            assert!(matches!(result, Err(TileError::PatternMismatch { .. })));
        }
    }

    #[test]
    fn test_resolve_digits_have_no_fixed_width() {
        let resolved = resolve_path(Path::new("t_y009_x10.png"), 1, 95).unwrap();
        assert_eq!(resolved, PathBuf::from("t_y10_x105.png"));
    }

    #[test]
    fn test_resolve_leftmost_match_drops_trailing_text() {
        let resolved = resolve_path(Path::new("a_y1_x2_b_y7_x7_height.png"), 1, 1).unwrap();
        assert_eq!(resolved, PathBuf::from("a_y2_x3.png"));
    }

    #[test]
    fn test_resolve_skips_partial_markers() {
        // `_yes` and `_y3_z` do not complete the pattern; the later suffix does.
        let resolved = resolve_path(Path::new("map_yes_y3_z_y4_x5.png"), 0, 1).unwrap();
        assert_eq!(resolved, PathBuf::from("map_yes_y3_z_y4_x6.png"));
    }

    #[test]
    fn test_resolve_rejects_negative_coordinates() {
        let result = resolve_path(Path::new("t_y1_x0.png"), -2, 0);
        match result {
            Err(TileError::NegativeCoordinate { y, x, .. }) => {
                assert_eq!(y, -1);
                assert_eq!(x, 0);
            }
            other => panic!("expected negative coordinate error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_overflow() {
        let result = resolve_path(Path::new("t_y99999999999999999999_x0.png"), 0, 0);
        assert!(matches!(result, Err(TileError::CoordinateOverflow { .. })));
    }

    #[test]
    fn test_resolve_is_pure() {
        let base = Path::new("dir/terrain_y2_x5.png");
        let first = resolve_path(base, 4, 2).unwrap();
        let second = resolve_path(base, 4, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_optional_empty_means_absent() {
        for (row, col) in [(0, 0), (2, 5)] {
            assert_eq!(resolve_optional_path(None, row, col).unwrap(), None);
            assert_eq!(resolve_optional_path(Some(Path::new("")), row, col).unwrap(), None);
        }
        let tex = resolve_optional_path(Some(Path::new("c_y0_x0.png")), 1, 1).unwrap();
        assert_eq!(tex, Some(PathBuf::from("c_y1_x1.png")));
    }

    #[test]
    fn test_coordinate_stem_parse() {
        let stem = CoordinateStem::parse("Gaea_Height_y12_x3").unwrap();
        assert_eq!(stem.head, "Gaea_Height_");
        assert_eq!(stem.y, "12");
        assert_eq!(stem.x, "3");
        assert!(CoordinateStem::parse("Gaea_Height_y_x3").is_none());
        assert!(CoordinateStem::parse("Gaea_Height_y1x3").is_none());
        // `y` must open the stem or follow an underscore.
        assert!(CoordinateStem::parse("Heighty1_x3").is_none());

        let bare = CoordinateStem::parse("y4_x0").unwrap();
        assert_eq!(bare.head, "");
        assert_eq!(bare.with_coordinates(5, 1), "y5_x1");
    }

    #[test]
    fn test_literal_file_set_drops_empty_optionals() {
        let set = TileFileSet::literal(Path::new("flat.png"), Some(Path::new("")), Some(Path::new("r.png")));
        assert_eq!(set.heightmap, PathBuf::from("flat.png"));
        assert_eq!(set.texture, None);
        assert_eq!(set.roughness, Some(PathBuf::from("r.png")));
    }
}
