//! Read-through-or-compute coordinator.

use std::fmt;
use std::sync::Arc;

use devgen_abstraction::Generator;
use tracing::{debug, error, info};

use crate::memo::error::{MemoError, MemoResult};
use crate::memo::request::GenerateRequest;
use crate::storage::{Entry, EntryStore};

/// Where a resolved entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from the store without calling the generator.
    Cached,
    /// Produced by the generator and written to the store.
    Generated,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// The authoritative entry returned by `resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The entry as stored.
    pub entry: Entry,
    /// Whether the generator ran.
    pub source: ResolutionSource,
}

/// Decides between serving a stored entry and generating a new one.
///
/// Cheap to clone; every request task holds its own handle. Concurrent
/// resolves for the same device may both generate, in which case the last
/// write wins.
#[derive(Clone)]
pub struct MemoCoordinator {
    store: Arc<dyn EntryStore>,
    generator: Arc<dyn Generator>,
}

impl fmt::Debug for MemoCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCoordinator")
            .field("store", &self.store.backend())
            .field("generator", &self.generator.model_id())
            .finish()
    }
}

impl MemoCoordinator {
    /// Creates a coordinator over the given store and generator.
    pub fn new(store: Arc<dyn EntryStore>, generator: Arc<dyn Generator>) -> Self {
        Self { store, generator }
    }

    /// Returns the stored entry for the request's device, generating and
    /// storing a new one when there is none or `refresh` is set.
    ///
    /// On a hit the stored entry is returned unchanged; the request's tags and
    /// prompt are ignored.
    ///
    /// # Errors
    /// * `MemoError::InvalidInput` - a required field is empty; nothing was accessed
    /// * `MemoError::Generation` - the generator failed; the store is untouched
    /// * `MemoError::Storage` - the lookup or the write failed
    pub async fn resolve(&self, request: GenerateRequest) -> MemoResult<Resolution> {
        request.validate()?;

        if !request.refresh {
            if let Some(entry) = self.store.get(&request.device_name).await? {
                info!(
                    device_name = %request.device_name,
                    backend = self.store.backend(),
                    "Serving stored entry"
                );
                return Ok(Resolution { entry, source: ResolutionSource::Cached });
            }
        }

        info!(
            device_name = %request.device_name,
            refresh = request.refresh,
            model_id = %self.generator.model_id(),
            "Generating entry"
        );

        let output = self.generator.generate(&request.prompt).await.map_err(|e| {
            error!(device_name = %request.device_name, error = %e, "Generation failed");
            e
        })?;

        let entry = request.into_entry(output);
        self.store.put(&entry).await.map_err(|e| {
            error!(
                device_name = %entry.device_name,
                error = %e,
                "Failed to store generated entry; output discarded"
            );
            e
        })?;

        debug!(device_name = %entry.device_name, output_len = entry.output.len(), "Entry stored");
        Ok(Resolution { entry, source: ResolutionSource::Generated })
    }

    /// Returns the stored entry for `device_name`.
    ///
    /// # Errors
    /// * `MemoError::InvalidInput` - `device_name` is empty
    /// * `MemoError::UnknownDevice` - no entry exists
    /// * `MemoError::Storage` - the lookup failed
    pub async fn fetch(&self, device_name: &str) -> MemoResult<Entry> {
        if device_name.is_empty() {
            return Err(MemoError::InvalidInput("device is required".to_string()));
        }

        self.store
            .get(device_name)
            .await?
            .ok_or_else(|| MemoError::UnknownDevice(device_name.to_string()))
    }
}
