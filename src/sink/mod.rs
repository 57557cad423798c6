//! Wallpaper sinks: where a finished canvas is handed off.

pub(crate) mod desktop;
