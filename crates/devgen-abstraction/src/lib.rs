//! Generation abstraction layer for devgen.
//!
//! This module defines the trait every text-generation provider implements and
//! the errors a single generation attempt can produce.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents an error that can occur during one generation attempt.
///
/// A malformed provider payload is not an error: providers degrade to the raw
/// body instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Transport Error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The generator cannot be built or used as configured (e.g. missing credential).
    #[error("Configuration Error: {0}")]
    Configuration(String),
}

impl GenerationError {
    /// Returns true when the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// A single-attempt text generator.
///
/// Implementations hold no shared mutable state and must be safe to call from
/// any number of concurrent tasks. They never retry.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produces output text for `prompt`.
    ///
    /// # Errors
    /// Returns a `GenerationError` if the provider could not be reached or
    /// rejected the request.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Returns the model identifier sent with every request.
    fn model_id(&self) -> &str;
}
