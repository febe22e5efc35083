//! Shared test utilities for Devgen Core integration tests.
//!
//! This module provides scripted generators, failing stores and a helper that
//! starts the HTTP server on an ephemeral port.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use devgen_abstraction::{GenerationError, Generator};
use devgen_core::auth::ApiKeyAuth;
use devgen_core::memo::{GenerateRequest, MemoCoordinator};
use devgen_core::server::{self, AppState};
use devgen_core::storage::{Entry, EntryStore, StorageError, StorageResult};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Secret the test servers are configured with.
pub const TEST_API_KEY: &str = "integration-secret";

/// Generator returning queued outputs in order and counting invocations.
///
/// Once the queue is drained it echoes `out-<n>` for the n-th call.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    outputs: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outputs<I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GenerationError>>,
    {
        Self { outputs: Mutex::new(outputs.into_iter().collect()), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.outputs.lock().unwrap().pop_front().unwrap_or_else(|| Ok(format!("out-{n}")))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Store whose reads succeed against an inner store and whose writes fail.
pub struct ReadOnlyStore<S> {
    pub inner: S,
}

#[async_trait]
impl<S: EntryStore> EntryStore for ReadOnlyStore<S> {
    async fn get(&self, device_name: &str) -> StorageResult<Option<Entry>> {
        self.inner.get(device_name).await
    }

    async fn put(&self, _entry: &Entry) -> StorageResult<()> {
        Err(StorageError::Background("disk full".to_string()))
    }

    fn backend(&self) -> &'static str {
        "read-only"
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl EntryStore for BrokenStore {
    async fn get(&self, _device_name: &str) -> StorageResult<Option<Entry>> {
        Err(StorageError::Background("database is locked".to_string()))
    }

    async fn put(&self, _entry: &Entry) -> StorageResult<()> {
        Err(StorageError::Background("database is locked".to_string()))
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

/// Builds a valid request for `device`.
pub fn request(device: &str, prompt: &str, refresh: bool) -> GenerateRequest {
    GenerateRequest {
        device_name: device.to_string(),
        keyword: "firmware".to_string(),
        language: "c".to_string(),
        prompt: prompt.to_string(),
        refresh,
    }
}

/// A server running on an ephemeral port. Dropping it stops the accept loop.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Starts a test server over `store` and `generator`.
///
/// # Panics
/// Panics if the listener cannot be bound.
pub async fn start_test_server(
    store: Arc<dyn EntryStore>,
    generator: Arc<dyn Generator>,
) -> TestServer {
    let state = Arc::new(AppState::new(
        MemoCoordinator::new(store, generator),
        ApiKeyAuth::new(TEST_API_KEY).unwrap(),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind to port 0");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        server::serve(listener, state, async {
            let _ = rx.await;
        })
        .await
        .expect("Server failed to run");
    });

    TestServer { addr, shutdown: Some(tx) }
}
