//! Tests for the SQLite entry store on disk.

mod common;

use std::sync::Arc;

use common::{ScriptedGenerator, request};
use devgen_core::memo::{MemoCoordinator, ResolutionSource};
use devgen_core::storage::{Entry, EntryStore, SqliteEntryStore};
use tempfile::TempDir;

fn entry(device: &str, output: &str) -> Entry {
    Entry {
        device_name: device.to_string(),
        keyword: "sensor".to_string(),
        language: "rust".to_string(),
        prompt: "read the thermistor".to_string(),
        output: output.to_string(),
    }
}

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    {
        let store = SqliteEntryStore::open(&path).unwrap();
        store.put(&entry("dev1", "fn main() {}")).await.unwrap();
    }

    let reopened = SqliteEntryStore::open(&path).unwrap();
    assert_eq!(reopened.get("dev1").await.unwrap(), Some(entry("dev1", "fn main() {}")));
}

#[tokio::test]
async fn test_memoization_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    let first_generator = Arc::new(ScriptedGenerator::new());
    {
        let store = Arc::new(SqliteEntryStore::open(&path).unwrap());
        let coordinator = MemoCoordinator::new(store, first_generator.clone());
        coordinator.resolve(request("dev1", "p", false)).await.unwrap();
    }

    let second_generator = Arc::new(ScriptedGenerator::new());
    let store = Arc::new(SqliteEntryStore::open(&path).unwrap());
    let coordinator = MemoCoordinator::new(store, second_generator.clone());
    let resolution = coordinator.resolve(request("dev1", "p", false)).await.unwrap();

    assert_eq!(resolution.source, ResolutionSource::Cached);
    assert_eq!(resolution.entry.output, "out-1");
    assert_eq!(first_generator.calls(), 1);
    assert_eq!(second_generator.calls(), 0);
}

#[tokio::test]
async fn test_upsert_replaces_all_fields() {
    let dir = TempDir::new().unwrap();
    let store = SqliteEntryStore::open(dir.path().join("data.db")).unwrap();

    store.put(&entry("dev1", "old")).await.unwrap();
    let replacement = Entry {
        device_name: "dev1".to_string(),
        keyword: "motor".to_string(),
        language: "c".to_string(),
        prompt: "spin".to_string(),
        output: "new".to_string(),
    };
    store.put(&replacement).await.unwrap();

    assert_eq!(store.get("dev1").await.unwrap(), Some(replacement));
}

#[tokio::test]
async fn test_text_is_stored_verbatim() {
    let dir = TempDir::new().unwrap();
    let store = SqliteEntryStore::open(dir.path().join("data.db")).unwrap();

    let tricky = entry("dev'; DROP TABLE entries; --", "line1\n\tline2 \u{1F600}");
    store.put(&tricky).await.unwrap();

    assert_eq!(store.get(&tricky.device_name).await.unwrap(), Some(tricky));
}

#[tokio::test]
async fn test_open_fails_for_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("data.db");
    assert!(SqliteEntryStore::open(path).is_err());
}
