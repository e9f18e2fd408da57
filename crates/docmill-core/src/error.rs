//! Error types for Docmill.

use thiserror::Error;

use crate::options::LoadingMethod;

#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing strategy parameters. Caller error, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction backend failure, surfaced with backend identity and cause.
    #[error("Load error ({backend}): {cause}")]
    Load {
        backend: LoadingMethod,
        cause: String,
    },

    /// External backend exceeded its allotted time.
    #[error("Timeout: {backend} did not finish within {seconds}s")]
    Timeout {
        backend: LoadingMethod,
        seconds: u64,
    },

    /// Internal chunking invariant violation. A bug, never swallowed.
    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
