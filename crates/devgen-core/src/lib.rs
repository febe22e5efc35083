//! Devgen Core - memoized device code generation service.
//!
//! This crate provides:
//! - Entry storage keyed by device name (SQLite or in-memory)
//! - The memoization coordinator deciding when the generator runs
//! - API key authentication and the HTTP server
//! - Configuration management and error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use devgen_core::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> devgen_core::error::Result<()> {
//!     let config = Config::load()?;
//!     server::run(&config).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod memo;
pub mod server;
pub mod storage;

pub use auth::{ApiKeyAuth, AuthError};
pub use config::Config;
pub use error::{DevgenError, Result};
pub use memo::{GenerateRequest, MemoCoordinator, MemoError, Resolution, ResolutionSource};
pub use server::AppState;
pub use storage::{
    Database, Entry, EntryStore, InMemoryEntryStore, SqliteEntryStore, StorageError,
};
