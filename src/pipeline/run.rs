use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::canvas::compose::compose_canvas;
use crate::config::settings::Config;
use crate::fetch::tile::TileFetcher;
use crate::fetch::transport::TileTransport;
use crate::foundation::core::SnapshotTime;
use crate::foundation::error::{HimawariError, HimawariResult};
use crate::grid::assemble::GridAssembler;
use crate::sink::desktop::WallpaperSink;
use crate::snapshot::align::align_snapshot;
use crate::store::retention::RetentionStore;

/// What a successful run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Snapshot the canvas shows.
    pub snapshot: SnapshotTime,
    /// Absolute path of the saved canvas handed to the sink.
    pub path: PathBuf,
    /// Old artifacts deleted before fetching.
    pub pruned: Vec<PathBuf>,
}

/// Prune, align, assemble, compose, save, apply.
///
/// Pipeline:
/// 1. [`RetentionStore::prune`] down to `max_pic_count` (failures are logged, never fatal)
/// 2. [`align_snapshot`](crate::align_snapshot) from `now`
/// 3. [`GridAssembler::assemble`] every cell from the configured mirrors
/// 4. [`compose_canvas`](crate::compose_canvas) onto the configured canvas
/// 5. [`RetentionStore::save`]
/// 6. [`WallpaperSink::apply`] with the saved path
///
/// Any failure in steps 2-5 returns before the sink is touched, so the previous wallpaper stays.
/// Completed pruning is not rolled back.
#[tracing::instrument(skip_all)]
pub fn run_once(
    config: &Config,
    transport: &dyn TileTransport,
    sink: &mut dyn WallpaperSink,
    now: DateTime<Utc>,
) -> HimawariResult<RunReport> {
    let store = RetentionStore::open(config.save_dir())?;
    let pruned = match store.prune(config.max_pic_count()) {
        Ok(pruned) => pruned,
        Err(e) => {
            tracing::warn!(error = %e, "pruning old images failed, continuing");
            Vec::new()
        }
    };

    let snapshot = align_snapshot(now, config.delay_minutes(), config.align_minutes());
    tracing::info!(%snapshot, mirrors = config.mirrors().len(), "fetching snapshot");

    let fetcher = TileFetcher::new(transport, config.mirrors(), config.grid());
    let artifact_dir = config.keep_tiles().then(|| store.dir());
    let composite = GridAssembler::new(fetcher, config.fetch_concurrency())
        .with_artifact_dir(artifact_dir)
        .assemble(snapshot)?;

    let canvas = compose_canvas(
        &composite,
        config.canvas(),
        config.cover_ratio(),
        config.scale_mode().filter(),
    )?;
    drop(composite);

    let saved = store.save(&canvas, config.grid(), snapshot)?;
    let path = std::path::absolute(&saved).map_err(|e| {
        HimawariError::persistence(format!("resolve '{}': {e}", saved.display()))
    })?;

    sink.apply(&path)?;

    Ok(RunReport {
        snapshot,
        path,
        pruned,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
