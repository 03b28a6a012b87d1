//! Store error types.

use std::path::PathBuf;
use thiserror::Error;
use trajectory_core::DomainError;

/// Errors raised by a [`RemoteSource`](crate::RemoteSource)
#[derive(Debug, Error)]
pub enum SourceError {
    /// I/O error while reading records
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Records were not valid JSON or not in the expected shape
    #[error("JSON error: {0}")]
    Json(String),

    /// Source location does not exist
    #[error("Source not found: {0}")]
    NotFound(PathBuf),

    /// Source refused or failed the request
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Json(e.to_string())
    }
}

/// Errors raised by the [`DataStore`](crate::DataStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Fetching raw records failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Records could not be turned into entities
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
