use std::path::PathBuf;

use image::imageops::FilterType;

use crate::foundation::core::CanvasSize;

/// Raw, JSON-facing configuration as a user writes it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct ConfigDef {
    pub(crate) base_url: MirrorsDef,
    pub(crate) delay_minutes: u32,
    pub(crate) update_interval_minutes: u32,
    #[serde(default)]
    pub(crate) align_minutes: Option<u32>,
    pub(crate) nd: u32,
    pub(crate) tile_size: u32,
    #[serde(default)]
    pub(crate) scale_mode: ScaleMode,
    pub(crate) cover_ratio: f64,
    pub(crate) save_dir: PathBuf,
    pub(crate) pic_size: CanvasSize,
    pub(crate) max_pic_count: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub(crate) request_timeout_secs: u64,
    #[serde(default = "default_fetch_concurrency")]
    pub(crate) fetch_concurrency: usize,
    #[serde(default = "default_keep_tiles")]
    pub(crate) keep_tiles: bool,
}

/// `base_url` is either a single mirror or an ordered list.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum MirrorsDef {
    One(String),
    Many(Vec<String>),
}

impl MirrorsDef {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(url) => vec![url],
            Self::Many(urls) => urls,
        }
    }
}

/// Resampling filter used when shrinking the composite onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Lanczos with window 3.
    #[default]
    Lanczos,
    /// Cubic Catmull-Rom.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Linear.
    Triangle,
    /// Nearest neighbour.
    Nearest,
}

impl ScaleMode {
    /// Matching `image` resize filter.
    pub fn filter(self) -> FilterType {
        match self {
            Self::Lanczos => FilterType::Lanczos3,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Triangle => FilterType::Triangle,
            Self::Nearest => FilterType::Nearest,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_fetch_concurrency() -> usize {
    4
}

fn default_keep_tiles() -> bool {
    true
}
