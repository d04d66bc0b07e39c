//! Common error types for the reel catalog core

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the catalog core
///
/// Source read failures (`Network`, `Parse`) never reach the end user on the
/// load path; they only make a source non-authoritative. Everything else is
/// returned to the caller of the admin operation that failed.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote or fallback document could not be fetched (includes timeouts)
    #[error("Network error: {0}")]
    Network(String),

    /// Document was fetched but is not a JSON array of videos
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid admin input (e.g. empty video ID)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A video with this ID is already in the catalog
    #[error("Video already exists: {0}")]
    Duplicate(String),

    /// Requested video not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wrong admin password, or admin operation attempted while locked
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Catalog could not be published at all (not even as a download)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Local key-value cache read/write failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error outside the load path
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error only demotes a load source to non-authoritative
    pub fn is_recoverable_source_failure(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Parse(_))
    }
}
