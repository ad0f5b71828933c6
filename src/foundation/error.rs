use std::path::{Path, PathBuf};

/// Convenience result type used across the crate.
pub type PlaceResult<T> = Result<T, PlaceError>;

/// Top-level error taxonomy for ingestion and rendering runs.
///
/// Every variant is fatal to the phase that returns it. Recoverable conditions (moderation
/// lines, dropped legacy records, failed encode jobs) never surface as a `PlaceError`.
#[derive(thiserror::Error, Debug)]
pub enum PlaceError {
    /// A source or destination could not be read or written.
    #[error("io error at '{}': {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Input does not match the selected epoch's record format.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid options or a violated input invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// The encoder pool could not accept or complete work.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlaceError {
    /// Build a [`PlaceError::Io`] value for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`PlaceError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`PlaceError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlaceError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
