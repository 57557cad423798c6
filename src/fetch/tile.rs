use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::fetch::transport::{FetchError, TileTransport};
use crate::foundation::core::{GridCoord, GridSpec, SnapshotTime};
use crate::foundation::error::{HimawariError, HimawariResult};

/// One decoded tile and the cell it belongs to.
#[derive(Clone, Debug)]
pub struct Tile {
    /// Cell this tile fills.
    pub coord: GridCoord,
    /// Decoded pixels.
    pub image: RgbImage,
}

/// `{base}/{N}d/{tile_size}/{YYYY}/{MM}/{DD}/{HHMMSS}_{col}_{row}.png`
pub fn tile_url(base: &str, grid: GridSpec, snapshot: SnapshotTime, coord: GridCoord) -> String {
    format!(
        "{base}/{}d/{}/{}_{}_{}.png",
        grid.density,
        grid.tile_size,
        snapshot.url_path(),
        coord.col,
        coord.row
    )
}

/// Where the raw bytes of a tile are kept when debug artifacts are enabled.
pub fn tile_artifact_path(dir: &Path, coord: GridCoord) -> PathBuf {
    dir.join(format!("tile_{}_{}.png", coord.row, coord.col))
}

/// Fetches single tiles, trying mirrors strictly in priority order.
#[derive(Clone, Copy)]
pub struct TileFetcher<'a> {
    transport: &'a dyn TileTransport,
    mirrors: &'a [String],
    grid: GridSpec,
}

impl<'a> TileFetcher<'a> {
    /// Fetcher over `mirrors`, tried in slice order.
    pub fn new(transport: &'a dyn TileTransport, mirrors: &'a [String], grid: GridSpec) -> Self {
        Self {
            transport,
            mirrors,
            grid,
        }
    }

    /// Grid this fetcher addresses.
    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    /// Fetch and decode the tile at `coord`.
    ///
    /// The first mirror that returns a decodable body wins; later mirrors are not contacted.
    /// When `artifact_dir` is set, the winning mirror's raw bytes are written to
    /// [`tile_artifact_path`] before decoding. Fails with [`HimawariError::TileUnavailable`]
    /// carrying the last mirror's error once every mirror has failed.
    pub fn fetch(
        &self,
        snapshot: SnapshotTime,
        coord: GridCoord,
        artifact_dir: Option<&Path>,
    ) -> HimawariResult<Tile> {
        let mut last_err = FetchError::NoMirrors;
        for base in self.mirrors {
            let url = tile_url(base, self.grid, snapshot, coord);
            tracing::debug!(%url, "downloading tile");
            match self.try_mirror(&url, coord, artifact_dir) {
                Ok(image) => return Ok(Tile { coord, image }),
                Err(e) => {
                    tracing::warn!(%url, error = %e, "mirror failed, trying next");
                    last_err = e;
                }
            }
        }
        Err(HimawariError::TileUnavailable {
            coord,
            cause: last_err,
        })
    }

    fn try_mirror(
        &self,
        url: &str,
        coord: GridCoord,
        artifact_dir: Option<&Path>,
    ) -> Result<RgbImage, FetchError> {
        let bytes = self.transport.get(url)?;
        if let Some(dir) = artifact_dir {
            std::fs::write(tile_artifact_path(dir, coord), &bytes)?;
        }
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/tile.rs"]
mod tests;
