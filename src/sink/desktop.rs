use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::error::{HimawariError, HimawariResult};

/// Consumer of finished canvases.
pub trait WallpaperSink {
    /// Apply the image at `path` (absolute) as the background of every desktop.
    fn apply(&mut self, path: &Path) -> HimawariResult<()>;

    /// Put the system default wallpaper back.
    fn restore_default(&mut self) -> HimawariResult<()>;
}

/// Sets the macOS desktop picture through `osascript`.
#[derive(Clone, Debug, Default)]
pub struct DesktopSink;

impl DesktopSink {
    /// Sink driving `osascript`.
    pub fn new() -> Self {
        Self
    }
}

impl WallpaperSink for DesktopSink {
    fn apply(&mut self, path: &Path) -> HimawariResult<()> {
        if !path.is_absolute() {
            return Err(HimawariError::sink(format!(
                "wallpaper path must be absolute, got '{}'",
                path.display()
            )));
        }
        run_osascript(&apply_script(path))?;
        tracing::info!(path = %path.display(), "wallpaper updated");
        Ok(())
    }

    fn restore_default(&mut self) -> HimawariResult<()> {
        run_osascript(&restore_script())?;
        tracing::info!("wallpaper restored to default");
        Ok(())
    }
}

/// Logs instead of touching the desktop. Used for `--no-apply` runs.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl WallpaperSink for NullSink {
    fn apply(&mut self, path: &Path) -> HimawariResult<()> {
        tracing::info!(path = %path.display(), "wallpaper apply skipped");
        Ok(())
    }

    fn restore_default(&mut self) -> HimawariResult<()> {
        tracing::info!("wallpaper restore skipped");
        Ok(())
    }
}

pub(crate) fn apply_script(path: &Path) -> String {
    format!(
        r#"tell application "System Events"
    tell every desktop
        set picture to "{}"
    end tell
end tell"#,
        applescript_escape(&path.to_string_lossy())
    )
}

pub(crate) fn restore_script() -> String {
    r#"tell application "System Events"
    set desktopCount to count of desktops
    repeat with desktopNumber from 1 to desktopCount
        tell desktop desktopNumber
            set picture to (path to pictures folder as string) & "DefaultDesktop.jpg"
        end tell
    end repeat
end tell"#
        .to_string()
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn run_osascript(script: &str) -> HimawariResult<()> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            HimawariError::sink(format!(
                "failed to spawn osascript (is this macOS?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HimawariError::sink(format!(
            "osascript exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/sink/desktop.rs"]
mod tests;
