//! SQLite connection holding the `entries` table.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::storage::error::StorageResult;

/// How long a writer waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// An open SQLite connection with the entries schema in place.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// File databases run in WAL mode so `get` never blocks behind a `put`
    /// from another process sharing the file.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %mode, "Opened SQLite database");

        Self::with_schema(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn with_schema(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS entries (
                device_name TEXT PRIMARY KEY,
                keyword TEXT NOT NULL,
                language TEXT NOT NULL,
                prompt TEXT NOT NULL,
                output TEXT NOT NULL
            );
            ",
        )?;
        info!("Entries schema ready");
        Ok(Self { conn })
    }
}
