use std::path::Path;

use image::RgbImage;
use rayon::prelude::*;

use crate::fetch::tile::{Tile, TileFetcher};
use crate::foundation::core::{GridCoord, SnapshotTime};
use crate::foundation::error::{HimawariError, HimawariResult};

/// Fetches every cell of the grid and stitches the tiles into one composite.
///
/// No partial composite is ever produced: the first cell that exhausts its mirrors aborts the
/// whole grid with [`HimawariError::GridUnavailable`].
pub struct GridAssembler<'a> {
    fetcher: TileFetcher<'a>,
    concurrency: usize,
    artifact_dir: Option<&'a Path>,
}

impl<'a> GridAssembler<'a> {
    /// `concurrency` bounds in-flight fetches. `1` fetches strictly row-major on the caller's
    /// thread.
    pub fn new(fetcher: TileFetcher<'a>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency,
            artifact_dir: None,
        }
    }

    /// Keep each tile's raw bytes in `dir` (see [`crate::tile_artifact_path`]).
    pub fn with_artifact_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.artifact_dir = dir;
        self
    }

    /// Fetch all `N * N` cells for `snapshot` and stitch them row-major.
    #[tracing::instrument(skip(self))]
    pub fn assemble(&self, snapshot: SnapshotTime) -> HimawariResult<RgbImage> {
        let grid = self.fetcher.grid();
        tracing::info!(
            density = grid.density,
            concurrency = self.concurrency,
            "fetching grid"
        );
        let tiles = if self.concurrency <= 1 {
            self.fetch_sequential(snapshot)?
        } else {
            self.fetch_parallel(snapshot)?
        };
        tracing::info!(tiles = tiles.len(), "all tiles fetched, stitching");
        stitch(grid.density, &tiles)
    }

    fn fetch_sequential(&self, snapshot: SnapshotTime) -> HimawariResult<Vec<Tile>> {
        let grid = self.fetcher.grid();
        let mut tiles = Vec::with_capacity(grid.cell_count());
        for coord in grid.cells() {
            let tile = self
                .fetcher
                .fetch(snapshot, coord, self.artifact_dir)
                .map_err(HimawariError::grid_from_cell)?;
            tiles.push(tile);
        }
        Ok(tiles)
    }

    fn fetch_parallel(&self, snapshot: SnapshotTime) -> HimawariResult<Vec<Tile>> {
        let pool = build_thread_pool(self.concurrency)?;
        let cells: Vec<GridCoord> = self.fetcher.grid().cells().collect();
        let fetcher = self.fetcher;
        let artifact_dir = self.artifact_dir;

        // Collecting into a Result keeps row-major order and stops handing out cells after the
        // first failure.
        pool.install(|| {
            cells
                .par_iter()
                .map(|&coord| fetcher.fetch(snapshot, coord, artifact_dir))
                .collect::<HimawariResult<Vec<Tile>>>()
        })
        .map_err(HimawariError::grid_from_cell)
    }
}

/// Place each tile at `(col * w, row * h)` on a `(N * w, N * h)` canvas.
///
/// `w`/`h` come from the first tile. Any tile of a different size, a missing or duplicate
/// cell, or an out-of-range coordinate is rejected rather than cropped.
pub fn stitch(density: u32, tiles: &[Tile]) -> HimawariResult<RgbImage> {
    let n = density as usize;
    if tiles.len() != n * n {
        return Err(HimawariError::grid(format!(
            "expected {} tiles for a {density}x{density} grid, got {}",
            n * n,
            tiles.len()
        )));
    }
    let Some(first) = tiles.first() else {
        return Err(HimawariError::grid("grid has no tiles"));
    };

    let (tile_w, tile_h) = first.image.dimensions();
    if tile_w == 0 || tile_h == 0 {
        return Err(HimawariError::grid("tiles must not be empty"));
    }
    let (Some(big_w), Some(big_h)) = (tile_w.checked_mul(density), tile_h.checked_mul(density))
    else {
        return Err(HimawariError::grid("composite dimensions overflow"));
    };

    let mut seen = vec![false; n * n];
    for tile in tiles {
        let GridCoord { row, col } = tile.coord;
        if row >= density || col >= density {
            return Err(HimawariError::grid(format!(
                "tile {} outside {density}x{density} grid",
                tile.coord
            )));
        }
        let slot = row as usize * n + col as usize;
        if std::mem::replace(&mut seen[slot], true) {
            return Err(HimawariError::grid(format!("duplicate tile {}", tile.coord)));
        }
        if tile.image.dimensions() != (tile_w, tile_h) {
            let (w, h) = tile.image.dimensions();
            return Err(HimawariError::grid(format!(
                "tile {} is {w}x{h}, expected uniform {tile_w}x{tile_h}",
                tile.coord
            )));
        }
    }

    let mut composite = RgbImage::new(big_w, big_h);
    for tile in tiles {
        let x = i64::from(tile.coord.col) * i64::from(tile_w);
        let y = i64::from(tile.coord.row) * i64::from(tile_h);
        image::imageops::replace(&mut composite, &tile.image, x, y);
    }
    Ok(composite)
}

fn build_thread_pool(threads: usize) -> HimawariResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("himawari-fetch-{i}"))
        .build()
        .map_err(|e| HimawariError::grid(format!("failed to build fetch thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/grid/assemble.rs"]
mod tests;
