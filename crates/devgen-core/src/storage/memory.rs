//! Process-memory entry store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::storage::entry::{Entry, EntryStore};
use crate::storage::error::{StorageError, StorageResult};

/// Entry store backed by a `HashMap` behind a `RwLock`.
///
/// Entries live for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryEntryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryEntryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    ///
    /// # Errors
    /// Returns `StorageError::Lock` if the lock is poisoned.
    pub fn len(&self) -> StorageResult<usize> {
        let entries = self.entries.read().map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(entries.len())
    }

    /// Whether the store holds no entries.
    ///
    /// # Errors
    /// Returns `StorageError::Lock` if the lock is poisoned.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn get(&self, device_name: &str) -> StorageResult<Option<Entry>> {
        let entries = self.entries.read().map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(entries.get(device_name).cloned())
    }

    async fn put(&self, entry: &Entry) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|e| StorageError::Lock(e.to_string()))?;
        entries.insert(entry.device_name.clone(), entry.clone());
        debug!(device_name = %entry.device_name, "Stored entry in memory");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(device: &str, prompt: &str, output: &str) -> Entry {
        Entry {
            device_name: device.to_string(),
            keyword: "kw".to_string(),
            language: "rust".to_string(),
            prompt: prompt.to_string(),
            output: output.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = InMemoryEntryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let store = InMemoryEntryStore::new();
        store.put(&entry("dev1", "p1", "o1")).await.unwrap();

        let mut replacement = entry("dev1", "p2", "o2");
        replacement.keyword = "other".to_string();
        store.put(&replacement).await.unwrap();

        assert_eq!(store.get("dev1").await.unwrap(), Some(replacement));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_error_not_missing() {
        let store = Arc::new(InMemoryEntryStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.get("dev1").await, Err(StorageError::Lock(_))));
        assert!(matches!(store.put(&entry("dev1", "p", "o")).await, Err(StorageError::Lock(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_never_see_torn_entries() {
        let store = Arc::new(InMemoryEntryStore::new());
        store.put(&entry("dev1", "prompt-0", "output-0")).await.unwrap();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 1..200 {
                    let e = entry("dev1", &format!("prompt-{i}"), &format!("output-{i}"));
                    store.put(&e).await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let e = store.get("dev1").await.unwrap().unwrap();
                    let p = e.prompt.trim_start_matches("prompt-");
                    let o = e.output.trim_start_matches("output-");
                    assert_eq!(p, o);
                }
            }));
        }

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
    }
}
