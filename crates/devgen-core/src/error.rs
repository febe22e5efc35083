//! Error types for devgen core.

use crate::auth::AuthError;
use crate::storage::StorageError;
use devgen_abstraction::GenerationError;
use thiserror::Error;

/// Core error type for service startup and lifecycle.
///
/// Per-request failures are [`crate::memo::MemoError`]s and never reach this type.
#[derive(Error, Debug)]
pub enum DevgenError {
    /// Server-related errors
    #[error("Server error: {0}")]
    Server(#[from] hyper::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address parsing errors
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generator construction errors
    #[error("Generator error: {0}")]
    Generation(#[from] GenerationError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Result type alias for devgen operations.
pub type Result<T> = std::result::Result<T, DevgenError>;
