//! The memoized record and the store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::storage::error::StorageResult;

/// The stored result of one device's last generation.
///
/// `prompt` and `output` always belong to the same generation; stores write
/// all five fields together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Primary key.
    pub device_name: String,
    /// Caller-supplied tag.
    pub keyword: String,
    /// Caller-supplied tag.
    pub language: String,
    /// The input that produced `output`.
    pub prompt: String,
    /// The generated text. May be empty.
    pub output: String,
}

/// Keyed storage of entries, one per device name.
///
/// Implementations must make `put` atomic per key: a concurrent `get` sees
/// either the previous entry or the new one, never a mix.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Returns the current entry for `device_name`, or `None` if there is none.
    ///
    /// # Errors
    /// Returns a `StorageError` for any failure other than a missing key.
    async fn get(&self, device_name: &str) -> StorageResult<Option<Entry>>;

    /// Inserts or wholly replaces the entry for `entry.device_name`.
    ///
    /// # Errors
    /// Returns a `StorageError` if the write did not happen. Nothing is
    /// partially applied.
    async fn put(&self, entry: &Entry) -> StorageResult<()>;

    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_shape() {
        let entry = Entry {
            device_name: "dev1".to_string(),
            keyword: "led".to_string(),
            language: "python".to_string(),
            prompt: "blink an LED".to_string(),
            output: "import machine".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "device_name": "dev1",
                "keyword": "led",
                "language": "python",
                "prompt": "blink an LED",
                "output": "import machine"
            })
        );
    }
}
