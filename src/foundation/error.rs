use crate::fetch::transport::FetchError;
use crate::foundation::core::GridCoord;

/// Convenience result type used across the crate.
pub type HimawariResult<T> = Result<T, HimawariError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum HimawariError {
    /// Missing or invalid configuration value. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Every mirror failed for one grid cell.
    #[error("tile {coord} unavailable from all mirrors")]
    TileUnavailable {
        /// Cell that could not be fetched.
        coord: GridCoord,
        /// Error reported by the last mirror tried.
        #[source]
        cause: FetchError,
    },

    /// The grid could not be assembled into a composite.
    #[error("grid unavailable: {reason}")]
    GridUnavailable {
        /// Human readable summary.
        reason: String,
        /// Cell level failure that aborted the grid, if any.
        #[source]
        cause: Option<Box<HimawariError>>,
    },

    /// Invalid cover ratio, canvas or resize failure.
    #[error("composition error: {0}")]
    Composition(String),

    /// Failure writing or listing persisted artifacts.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The wallpaper sink rejected the artifact.
    #[error("wallpaper sink error: {0}")]
    Sink(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HimawariError {
    /// Build a [`HimawariError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`HimawariError::GridUnavailable`] value without an underlying cell failure.
    pub fn grid(reason: impl Into<String>) -> Self {
        Self::GridUnavailable {
            reason: reason.into(),
            cause: None,
        }
    }

    /// Build a [`HimawariError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`HimawariError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`HimawariError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Wrap a cell level failure as the reason the whole grid was abandoned.
    pub(crate) fn grid_from_cell(cell: HimawariError) -> Self {
        let reason = match &cell {
            Self::TileUnavailable { coord, .. } => format!("cell {coord} failed"),
            other => other.to_string(),
        };
        Self::GridUnavailable {
            reason,
            cause: Some(Box::new(cell)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
