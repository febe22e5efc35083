//! Error types for the memoization coordinator.

use devgen_abstraction::GenerationError;
use thiserror::Error;

use crate::storage::StorageError;

/// Outcomes of `resolve`/`fetch` other than success.
#[derive(Error, Debug)]
pub enum MemoError {
    /// A required field was missing or empty. Nothing was read or written.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No entry exists for the requested device.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// The generator failed. The store was not touched.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The store failed to read or write.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for coordinator operations.
pub type MemoResult<T> = std::result::Result<T, MemoError>;
