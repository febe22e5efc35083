//! Shared-secret authentication for inbound HTTP requests.

use std::sync::Arc;

use http::HeaderMap;
use tracing::{debug, warn};

use crate::auth::error::{AuthError, AuthResult};

/// Header carrying the caller's secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the `X-API-Key` header against the configured service secret.
#[derive(Clone)]
pub struct ApiKeyAuth {
    secret: Arc<str>,
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth").field("secret", &"<redacted>").finish()
    }
}

impl ApiKeyAuth {
    /// Creates the check for `secret`.
    ///
    /// # Errors
    /// Returns `AuthError::MissingSecret` if `secret` is empty.
    pub fn new(secret: &str) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self { secret: Arc::from(secret) })
    }

    /// Authenticate a request by its headers.
    ///
    /// # Returns
    /// Ok(()) if the header matches, Err(AuthError) otherwise
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<()> {
        let provided = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("Rejected request without API key");
                AuthError::MissingKey
            })?;

        if constant_time_eq(provided.as_bytes(), self.secret.as_bytes()) {
            debug!("API key validated successfully");
            Ok(())
        } else {
            warn!("Rejected request with invalid API key");
            Err(AuthError::InvalidKey)
        }
    }
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
