use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbImage;

use crate::foundation::core::{GridSpec, SnapshotTime};
use crate::foundation::error::{HimawariError, HimawariResult};

const ARTIFACT_EXT: &str = "png";
const TILE_PREFIX: &str = "tile_";
const PARTIAL_SUFFIX: &str = ".partial";

/// `{N}d_{tile_size}_{YYYY}__{MM}__{DD}__{HHMMSS}.png`
pub fn artifact_file_name(grid: GridSpec, snapshot: SnapshotTime) -> String {
    format!(
        "{}d_{}_{}.{ARTIFACT_EXT}",
        grid.density,
        grid.tile_size,
        snapshot.file_token()
    )
}

/// Snapshot embedded in an artifact file name, or `None` when the name does not parse.
pub fn artifact_snapshot(file_name: &str) -> Option<SnapshotTime> {
    let stem = file_name.strip_suffix(".png")?;
    let mut parts = stem.splitn(3, '_');
    let density = parts.next()?;
    let tile_size = parts.next()?;
    let token = parts.next()?;

    let density = density.strip_suffix('d')?;
    if density.is_empty() || !density.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if tile_size.is_empty() || !tile_size.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    SnapshotTime::parse_file_token(token)
}

/// Output directory holding finished canvases, bounded by a count cap.
#[derive(Clone, Debug)]
pub struct RetentionStore {
    dir: PathBuf,
}

impl RetentionStore {
    /// Open `dir`, creating it if absent.
    pub fn open(dir: impl Into<PathBuf>) -> HimawariResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            HimawariError::persistence(format!(
                "create output directory '{}': {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Directory artifacts are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `canvas` under its deterministic name and return the final path.
    ///
    /// The PNG is written to a sibling `.partial` file and renamed into place, so readers never
    /// observe a truncated artifact. An existing artifact for the same snapshot is replaced.
    #[tracing::instrument(skip(self, canvas))]
    pub fn save(
        &self,
        canvas: &RgbImage,
        grid: GridSpec,
        snapshot: SnapshotTime,
    ) -> HimawariResult<PathBuf> {
        let name = artifact_file_name(grid, snapshot);
        let final_path = self.dir.join(&name);
        let partial_path = self.dir.join(format!(".{name}{PARTIAL_SUFFIX}"));

        let written = canvas
            .save_with_format(&partial_path, image::ImageFormat::Png)
            .with_context(|| format!("encode png '{}'", partial_path.display()))
            .and_then(|()| {
                std::fs::rename(&partial_path, &final_path).with_context(|| {
                    format!(
                        "rename '{}' to '{}'",
                        partial_path.display(),
                        final_path.display()
                    )
                })
            });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial_path);
            return Err(HimawariError::persistence(format!("{e:#}")));
        }

        tracing::info!(path = %final_path.display(), "saved canvas");
        Ok(final_path)
    }

    /// Artifacts currently in the directory, oldest first.
    ///
    /// Every `*.png` except tile debug images and in-flight `.partial` files counts. Names that
    /// do not parse sort before every parsed snapshot; ties break on file name.
    pub fn artifacts(&self) -> HimawariResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            HimawariError::persistence(format!("list '{}': {e}", self.dir.display()))
        })?;

        let mut found: Vec<(Option<SnapshotTime>, String, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                HimawariError::persistence(format!("list '{}': {e}", self.dir.display()))
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(raw_name) = path.file_name() else {
                continue;
            };
            let name = raw_name.to_string_lossy().into_owned();
            if !is_artifact_name(&name) {
                continue;
            }
            // Non UTF-8 names never parse and sort with the oldest.
            let snapshot = raw_name.to_str().and_then(artifact_snapshot);
            found.push((snapshot, name, path));
        }

        found.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(found.into_iter().map(|(_, _, path)| path).collect())
    }

    /// Delete the oldest artifacts so at most `max_count` remain.
    ///
    /// `.partial` files left by an interrupted save are removed first and are not part of the
    /// returned list. A file that cannot be removed is logged and skipped. Returns the artifact
    /// paths actually deleted.
    #[tracing::instrument(skip(self))]
    pub fn prune(&self, max_count: usize) -> HimawariResult<Vec<PathBuf>> {
        self.remove_stale_partials();
        let artifacts = self.artifacts()?;
        if artifacts.len() <= max_count {
            return Ok(Vec::new());
        }

        let excess = artifacts.len() - max_count;
        let mut deleted = Vec::with_capacity(excess);
        for path in artifacts.into_iter().take(excess) {
            tracing::info!(path = %path.display(), "deleting old image");
            match std::fs::remove_file(&path) {
                Ok(()) => deleted.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete old image");
                }
            }
        }
        Ok(deleted)
    }

    fn remove_stale_partials(&self) {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "failed to list output directory");
                return;
            }
        };
        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            let is_partial = path
                .file_name()
                .map(|n| is_partial_name(&n.to_string_lossy()))
                .unwrap_or(false);
            if !is_partial || !path.is_file() {
                continue;
            }
            tracing::info!(path = %path.display(), "deleting interrupted save");
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete interrupted save");
            }
        }
    }
}

fn is_partial_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX)
}

fn is_artifact_name(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    ext.eq_ignore_ascii_case(ARTIFACT_EXT)
        && !stem.is_empty()
        && !name.starts_with('.')
        && !name.starts_with(TILE_PREFIX)
}

#[cfg(test)]
#[path = "../../tests/unit/store/retention.rs"]
mod tests;
