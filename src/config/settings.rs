use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::{ConfigDef, ScaleMode};
use crate::foundation::core::{CanvasSize, GridSpec};
use crate::foundation::error::{HimawariError, HimawariResult};

/// Validated, immutable configuration.
///
/// Built once at process entry from a [`ConfigDef`] and handed by reference to every stage.
#[derive(Clone, Debug)]
pub struct Config {
    mirrors: Vec<String>,
    delay_minutes: u32,
    update_interval_minutes: u32,
    align_minutes: u32,
    grid: GridSpec,
    scale_mode: ScaleMode,
    cover_ratio: f64,
    save_dir: PathBuf,
    canvas: CanvasSize,
    max_pic_count: usize,
    request_timeout: Duration,
    fetch_concurrency: usize,
    keep_tiles: bool,
}

impl Config {
    /// Parse configuration JSON. Relative `save_dir` values resolve against `base_dir`.
    pub fn from_reader<R: std::io::Read>(r: R, base_dir: &Path) -> HimawariResult<Self> {
        let def: ConfigDef = serde_json::from_reader(r)
            .map_err(|e| HimawariError::config(format!("parse config JSON: {e}")))?;
        Self::from_def(def, base_dir)
    }

    /// Parse configuration from a JSON file. Relative paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> HimawariResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HimawariError::config(format!("open config '{}': {e}", path.display()))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_reader(BufReader::new(f), base_dir)
    }

    pub(crate) fn from_def(def: ConfigDef, base_dir: &Path) -> HimawariResult<Self> {
        let mirrors: Vec<String> = def
            .base_url
            .into_vec()
            .into_iter()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .collect();
        if mirrors.is_empty() {
            return Err(HimawariError::config("base_url must name at least one mirror"));
        }
        if mirrors.iter().any(String::is_empty) {
            return Err(HimawariError::config("base_url entries must be non-empty"));
        }

        if def.update_interval_minutes == 0 {
            return Err(HimawariError::config(
                "update_interval_minutes must be >= 1",
            ));
        }
        let align_minutes = def.align_minutes.unwrap_or(def.update_interval_minutes);
        if !(1..=60).contains(&align_minutes) {
            return Err(HimawariError::config(format!(
                "alignment granularity must be within 1..=60 minutes, got {align_minutes}"
            )));
        }

        let grid = GridSpec::new(def.nd, def.tile_size)?;

        validate_cover_ratio(def.cover_ratio)?;

        if def.pic_size.width == 0 || def.pic_size.height == 0 {
            return Err(HimawariError::config("pic_size width and height must be >= 1"));
        }
        if def.max_pic_count == 0 {
            return Err(HimawariError::config("max_pic_count must be >= 1"));
        }
        if def.request_timeout_secs == 0 {
            return Err(HimawariError::config("request_timeout_secs must be >= 1"));
        }
        if def.fetch_concurrency == 0 {
            return Err(HimawariError::config("fetch_concurrency must be >= 1"));
        }

        let save_dir = if def.save_dir.is_absolute() {
            def.save_dir
        } else {
            base_dir.join(def.save_dir)
        };

        Ok(Self {
            mirrors,
            delay_minutes: def.delay_minutes,
            update_interval_minutes: def.update_interval_minutes,
            align_minutes,
            grid,
            scale_mode: def.scale_mode,
            cover_ratio: def.cover_ratio,
            save_dir,
            canvas: def.pic_size,
            max_pic_count: def.max_pic_count,
            request_timeout: Duration::from_secs(def.request_timeout_secs),
            fetch_concurrency: def.fetch_concurrency,
            keep_tiles: def.keep_tiles,
        })
    }

    /// Mirror base URLs in priority order, without trailing `/`.
    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// Publication lag subtracted from `now` before aligning.
    pub fn delay_minutes(&self) -> u32 {
        self.delay_minutes
    }

    /// Period between runs in `watch` mode and for the launchd agent.
    pub fn update_interval_minutes(&self) -> u32 {
        self.update_interval_minutes
    }

    /// Snapshot alignment granularity in minutes.
    pub fn align_minutes(&self) -> u32 {
        self.align_minutes
    }

    /// Grid density and tile size.
    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    /// Resampling filter for the canvas resize.
    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    /// Fraction of the canvas short edge the earth disk covers.
    pub fn cover_ratio(&self) -> f64 {
        self.cover_ratio
    }

    /// Output directory, already resolved to the config file's directory.
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Target canvas size.
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Retention cap applied before each run.
    pub fn max_pic_count(&self) -> usize {
        self.max_pic_count
    }

    /// Timeout for a single tile request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Maximum tiles fetched at once.
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    /// Whether raw tile bytes are kept in the save directory as debug artifacts.
    pub fn keep_tiles(&self) -> bool {
        self.keep_tiles
    }
}

/// Cover ratio must be finite and within `(0, 1]`.
pub(crate) fn validate_cover_ratio(cover_ratio: f64) -> HimawariResult<()> {
    if !cover_ratio.is_finite() || cover_ratio <= 0.0 || cover_ratio > 1.0 {
        return Err(HimawariError::config(format!(
            "cover_ratio must be within (0, 1], got {cover_ratio}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
