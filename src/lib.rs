//! Himawari turns satellite tile grids into a live desktop wallpaper.
//!
//! Each run fetches one time-aligned snapshot as an `N x N` grid of tiles, stitches the grid into a
//! composite, fits the composite onto the display canvas, persists it, and hands the result to a
//! wallpaper sink.
//!
//! # Pipeline overview
//!
//! 1. **Prune**: drop the oldest saved canvases beyond the retention cap ([`RetentionStore`])
//! 2. **Align**: `now - delay`, floored to the publication interval ([`align_snapshot`])
//! 3. **Assemble**: fetch every cell with mirror failover and stitch ([`GridAssembler`])
//! 4. **Compose**: resize and center on a black canvas ([`compose_canvas`])
//! 5. **Save + apply**: write atomically, then call the [`WallpaperSink`]
//!
//! [`run_once`] sequences all of it. Configuration is an explicit [`Config`] value built once at
//! process entry; there is no global state beyond the output directory.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod canvas;
mod config;
mod fetch;
mod foundation;
mod grid;
mod pipeline;
mod schedule;
mod sink;
mod snapshot;
mod store;

pub use canvas::compose::{CanvasLayout, compose_canvas};
pub use config::model::ScaleMode;
pub use config::settings::Config;
pub use fetch::tile::{Tile, TileFetcher, tile_artifact_path, tile_url};
pub use fetch::transport::{FetchError, HttpTransport, TileTransport};
pub use foundation::core::{CanvasSize, GridCoord, GridSpec, SnapshotTime};
pub use foundation::error::{HimawariError, HimawariResult};
pub use grid::assemble::{GridAssembler, stitch};
pub use pipeline::run::{RunReport, run_once};
pub use schedule::launchd::{AGENT_LABEL, LaunchAgent};
pub use sink::desktop::{DesktopSink, NullSink, WallpaperSink};
pub use snapshot::align::align_snapshot;
pub use store::retention::{RetentionStore, artifact_file_name, artifact_snapshot};
