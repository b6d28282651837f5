//! Custom error types for the document store

use std::path::PathBuf;

use thiserror::Error;

/// Error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the durable image failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot or journal on disk cannot be trusted
    #[error("Store image {} is corrupt: {reason}", .path.display())]
    Corruption { path: PathBuf, reason: String },

    /// A lookup matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write would break a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store configuration error
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
