//! Error types for the storage layer.

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// A missing key is not an error: stores return `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Connection(#[from] rusqlite::Error),

    /// A store lock was poisoned by a panicking writer.
    #[error("Lock error: {0}")]
    Lock(String),

    /// The blocking task running a database operation failed.
    #[error("Background task error: {0}")]
    Background(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
