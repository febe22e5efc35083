//! Memoized generation.
//!
//! [`MemoCoordinator`] is the only place that decides whether the generator
//! runs. Per device the lifecycle is `Absent -> Present` on the first
//! successful generation and `Present -> Present` on each refresh; entries are
//! never removed.

mod coordinator;
mod error;
mod request;

pub use coordinator::{MemoCoordinator, Resolution, ResolutionSource};
pub use error::{MemoError, MemoResult};
pub use request::GenerateRequest;
