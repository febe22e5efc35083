//! SQLite-backed entry store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, error};

use crate::storage::database::Database;
use crate::storage::entry::{Entry, EntryStore};
use crate::storage::error::{StorageError, StorageResult};

/// Entry store persisted to the `entries` table.
///
/// Each operation takes the connection mutex on tokio's blocking pool, so
/// SQLite I/O never stalls the async workers.
#[derive(Clone)]
pub struct SqliteEntryStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteEntryStore {
    /// Wraps an opened database.
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(Mutex::new(db)) }
    }

    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    /// Returns `StorageError::Connection` if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Opens an in-memory database.
    ///
    /// # Errors
    /// Returns `StorageError::Connection` if SQLite fails to initialise.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Runs `f` against the locked database on the blocking pool.
    async fn with_db<F, R>(&self, f: F) -> StorageResult<R>
    where
        F: FnOnce(&Database) -> StorageResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let db = db.lock().map_err(|e| {
                error!(error = %e, "Failed to acquire database lock");
                StorageError::Lock(e.to_string())
            })?;
            f(&db)
        })
        .await
        .map_err(|e| StorageError::Background(e.to_string()))?
    }
}

impl std::fmt::Debug for SqliteEntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEntryStore").field("db", &"<Mutex<Database>>").finish()
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn get(&self, device_name: &str) -> StorageResult<Option<Entry>> {
        let device_name = device_name.to_string();
        self.with_db(move |db| {
            let entry = db
                .conn()
                .query_row(
                    "SELECT device_name, keyword, language, prompt, output FROM entries WHERE device_name = ?1",
                    params![device_name],
                    |row| {
                        Ok(Entry {
                            device_name: row.get(0)?,
                            keyword: row.get(1)?,
                            language: row.get(2)?,
                            prompt: row.get(3)?,
                            output: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(entry)
        })
        .await
    }

    async fn put(&self, entry: &Entry) -> StorageResult<()> {
        let entry = entry.clone();
        self.with_db(move |db| {
            db.conn().execute(
                r"
                INSERT INTO entries (device_name, keyword, language, prompt, output)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(device_name) DO UPDATE SET
                    keyword = excluded.keyword,
                    language = excluded.language,
                    prompt = excluded.prompt,
                    output = excluded.output
                ",
                params![entry.device_name, entry.keyword, entry.language, entry.prompt, entry.output],
            )?;
            debug!(device_name = %entry.device_name, "Stored entry in SQLite");
            Ok(())
        })
        .await
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(device: &str, prompt: &str, output: &str) -> Entry {
        Entry {
            device_name: device.to_string(),
            keyword: "led".to_string(),
            language: "python".to_string(),
            prompt: prompt.to_string(),
            output: output.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        assert_eq!(store.get("dev1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        let e = entry("dev1", "blink an LED", "import machine");
        store.put(&e).await.unwrap();
        assert_eq!(store.get("dev1").await.unwrap(), Some(e));
    }

    #[tokio::test]
    async fn test_put_replaces_all_columns() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        store.put(&entry("dev1", "old prompt", "old output")).await.unwrap();

        let replacement = Entry {
            device_name: "dev1".to_string(),
            keyword: "servo".to_string(),
            language: "c".to_string(),
            prompt: "new prompt".to_string(),
            output: String::new(),
        };
        store.put(&replacement).await.unwrap();

        assert_eq!(store.get("dev1").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_query_failure_is_error_not_missing() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        store.with_db(|db| Ok(db.conn().execute("DROP TABLE entries", [])?)).await.unwrap();

        assert!(matches!(store.get("dev1").await, Err(StorageError::Connection(_))));
        assert!(store.put(&entry("dev1", "p", "o")).await.is_err());
    }

    #[tokio::test]
    async fn test_backend_name() {
        let store = SqliteEntryStore::open_in_memory().unwrap();
        assert_eq!(store.backend(), "sqlite");
    }
}
