//! Storage layer for devgen.
//!
//! Defines the [`Entry`] record, the [`EntryStore`] contract, and its two
//! backends: a process-memory map and a SQLite table. Both give the same
//! per-key atomicity; the coordinator never knows which one it is using.

pub mod database;
pub mod entry;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use database::Database;
pub use entry::{Entry, EntryStore};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryEntryStore;
pub use sqlite::SqliteEntryStore;
