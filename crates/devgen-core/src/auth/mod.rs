//! Inbound request authentication.
//!
//! Every route that reaches the coordinator is guarded by [`ApiKeyAuth`],
//! which compares the `X-API-Key` header with the configured service secret.

mod error;
mod middleware;

pub use error::{AuthError, AuthResult};
pub use middleware::{API_KEY_HEADER, ApiKeyAuth};
