//! Error types for authentication operations.

use thiserror::Error;

/// Authentication-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No service secret was configured.
    #[error("Service API key is not configured")]
    MissingSecret,

    /// The request carried no API key header.
    #[error("Missing API key")]
    MissingKey,

    /// The request's API key did not match.
    #[error("Invalid API key")]
    InvalidKey,
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
