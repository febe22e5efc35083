//! Inbound generate request.

use serde::{Deserialize, Serialize};

use crate::memo::error::{MemoError, MemoResult};
use crate::storage::Entry;

/// A request to resolve the entry for a device.
///
/// Missing JSON fields decode to empty strings so they fail validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    /// Key of the entry.
    pub device_name: String,
    /// Caller-supplied tag, stored as-is.
    pub keyword: String,
    /// Caller-supplied tag, stored as-is.
    pub language: String,
    /// Input for the generator.
    pub prompt: String,
    /// Regenerate even if an entry exists.
    pub refresh: bool,
}

impl GenerateRequest {
    /// Checks that every string field is non-empty.
    ///
    /// # Errors
    /// Returns `MemoError::InvalidInput` naming the missing fields.
    pub fn validate(&self) -> MemoResult<()> {
        let missing: Vec<&str> = [
            ("device_name", &self.device_name),
            ("keyword", &self.keyword),
            ("language", &self.language),
            ("prompt", &self.prompt),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MemoError::InvalidInput(format!("missing required fields: {}", missing.join(", "))))
        }
    }

    /// Builds the entry this request produces with `output`.
    pub fn into_entry(self, output: String) -> Entry {
        Entry {
            device_name: self.device_name,
            keyword: self.keyword,
            language: self.language,
            prompt: self.prompt,
            output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GenerateRequest {
        GenerateRequest {
            device_name: "dev1".to_string(),
            keyword: "led".to_string(),
            language: "python".to_string(),
            prompt: "blink an LED".to_string(),
            refresh: false,
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_fields() {
        let mut request = valid();
        request.keyword.clear();
        request.prompt.clear();

        match request.validate() {
            Err(MemoError::InvalidInput(msg)) => {
                assert!(msg.contains("keyword"));
                assert!(msg.contains("prompt"));
                assert!(!msg.contains("device_name"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_json_fields_default_to_empty() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"device_name": "dev1", "prompt": "p"}"#).unwrap();
        assert_eq!(request.keyword, "");
        assert!(!request.refresh);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_into_entry_copies_request_fields() {
        let entry = valid().into_entry("import machine".to_string());
        assert_eq!(entry.device_name, "dev1");
        assert_eq!(entry.keyword, "led");
        assert_eq!(entry.language, "python");
        assert_eq!(entry.prompt, "blink an LED");
        assert_eq!(entry.output, "import machine");
    }
}
