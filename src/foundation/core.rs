use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::foundation::error::{HimawariError, HimawariResult};

/// Position of one tile inside the square grid, both axes in `[0, density)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCoord {
    /// Row index, top to bottom.
    pub row: u32,
    /// Column index, left to right.
    pub col: u32,
}

impl GridCoord {
    /// Cell at `row`, `col`.
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row {}, col {})", self.row, self.col)
    }
}

/// Grid density and the nominal pixel size of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSpec {
    /// Tiles per side (`N`).
    pub density: u32,
    /// Edge length of one tile as published by the mirrors.
    pub tile_size: u32,
}

impl GridSpec {
    /// Validated grid; both values must be non-zero.
    pub fn new(density: u32, tile_size: u32) -> HimawariResult<Self> {
        if density == 0 {
            return Err(HimawariError::config("grid density (nd) must be >= 1"));
        }
        if tile_size == 0 {
            return Err(HimawariError::config("tile_size must be >= 1"));
        }
        Ok(Self { density, tile_size })
    }

    /// `N * N`.
    pub fn cell_count(self) -> usize {
        (self.density as usize) * (self.density as usize)
    }

    /// All cells, rows outer and columns inner.
    pub fn cells(self) -> impl Iterator<Item = GridCoord> {
        let n = self.density;
        (0..n).flat_map(move |row| (0..n).map(move |col| GridCoord::new(row, col)))
    }
}

/// Target canvas in pixels. Serialized as `[width, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Canvas of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The smaller of width and height.
    pub fn short_edge(self) -> u32 {
        self.width.min(self.height)
    }
}

impl From<[u32; 2]> for CanvasSize {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<CanvasSize> for [u32; 2] {
    fn from(c: CanvasSize) -> Self {
        [c.width, c.height]
    }
}

/// Aligned instant a tile set represents.
///
/// Always UTC, with seconds and sub-seconds zeroed by [`crate::align_snapshot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotTime(DateTime<Utc>);

const URL_PATH_FORMAT: &str = "%Y/%m/%d/%H%M%S";
const FILE_TOKEN_FORMAT: &str = "%Y__%m__%d__%H%M%S";

impl SnapshotTime {
    pub(crate) fn from_aligned(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// The aligned UTC instant.
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// `YYYY/MM/DD/HHMMSS`, the form mirrors use in tile URLs.
    pub fn url_path(self) -> String {
        self.0.format(URL_PATH_FORMAT).to_string()
    }

    /// `YYYY__MM__DD__HHMMSS`, the URL path with separators flattened for file names.
    pub fn file_token(self) -> String {
        self.url_path().replace('/', "__")
    }

    /// Inverse of [`SnapshotTime::file_token`]. Returns `None` for anything malformed.
    pub fn parse_file_token(token: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(token, FILE_TOKEN_FORMAT)
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }
}

impl fmt::Display for SnapshotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
