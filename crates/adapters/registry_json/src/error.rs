//! Loader-specific error type wrapping IO and JSON errors.

use std::path::PathBuf;

use homegraph_domain::error::HomeGraphError;

/// Errors originating from reading a registry dump.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The dump file could not be read.
    #[error("unable to read registry dump {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dump is not valid JSON or does not match the expected shape.
    #[error("invalid registry dump")]
    Json(#[from] serde_json::Error),
}

impl From<LoaderError> for HomeGraphError {
    fn from(err: LoaderError) -> Self {
        Self::Registry(Box::new(err))
    }
}
