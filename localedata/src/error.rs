//! Error types for locale data resolution.
//!
//! A file that does not exist at a root is never an error: it folds into a
//! negative contribution. Everything here aborts the call that produced it.

use std::io;

use thiserror::Error;

/// Result type for locale data operations.
pub type Result<T> = std::result::Result<T, LocaleDataError>;

/// Errors that can occur while resolving locale data.
#[derive(Debug, Error)]
pub enum LocaleDataError {
    /// Missing or malformed construction or request arguments.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content was fetched but could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// The loader failed for a reason other than a missing file.
    #[error("Failed to load {path}: {source}")]
    Loader {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The loader returned a malformed batch.
    #[error("Loader batch error: {0}")]
    LoaderBatch(String),

    /// A blocking load was requested from a loader that only supports async reads.
    #[error("Loader does not support synchronous loading")]
    SyncUnsupported,
}

impl LocaleDataError {
    /// Check if this error came from the storage layer.
    pub fn is_loader_error(&self) -> bool {
        matches!(
            self,
            LocaleDataError::Loader { .. } | LocaleDataError::LoaderBatch(_)
        )
    }
}
