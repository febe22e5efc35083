//! HTTP server implementation.

pub mod logging;
pub mod routes;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use devgen_models::GeneratorFactory;
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceBuilder;
use tracing::{debug, error, info};

use crate::auth::ApiKeyAuth;
use crate::config::{Config, StorageBackend, StorageConfig};
use crate::error::{DevgenError, Result};
use crate::memo::MemoCoordinator;
use crate::storage::{EntryStore, InMemoryEntryStore, SqliteEntryStore};

use self::logging::RequestLoggerLayer;

/// Shared state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Decides between stored and freshly generated entries.
    pub coordinator: MemoCoordinator,
    /// Inbound API key check.
    pub auth: ApiKeyAuth,
}

impl AppState {
    pub fn new(coordinator: MemoCoordinator, auth: ApiKeyAuth) -> Self {
        Self { coordinator, auth }
    }

    /// Builds the store, generator and auth check described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened, the generator is
    /// misconfigured, or no service API key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let secret = config
            .service_api_key()
            .ok_or_else(|| DevgenError::Config("SERVICE_API_KEY is not set".to_string()))?;
        let auth = ApiKeyAuth::new(secret)?;

        let store = build_store(&config.storage)?;
        let generator = GeneratorFactory::create(config.generator_config()?)?;
        info!(
            backend = store.backend(),
            model = generator.model_id(),
            "Initialized entry store and generator"
        );

        Ok(Self::new(MemoCoordinator::new(store, generator), auth))
    }
}

/// Opens the configured entry store.
///
/// # Errors
///
/// Returns `DevgenError::Storage` if the SQLite database cannot be opened.
pub fn build_store(config: &StorageConfig) -> Result<Arc<dyn EntryStore>> {
    match config.backend {
        StorageBackend::Sqlite => {
            info!(path = %config.path.display(), "Opening SQLite entry store");
            Ok(Arc::new(SqliteEntryStore::open(&config.path)?))
        }
        StorageBackend::Memory => {
            info!("Using in-memory entry store");
            Ok(Arc::new(InMemoryEntryStore::new()))
        }
    }
}

/// Runs the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if startup fails or the address cannot be bound.
pub async fn run(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);

    let listener = TcpListener::bind(config.server.address).await?;
    info!(address = %listener.local_addr()?, "Starting devgen server");

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received");
    })
    .await
}

/// Accepts connections on `listener` until `shutdown` completes.
///
/// Connections already accepted keep running on their own tasks.
///
/// # Errors
///
/// Currently always returns `Ok`; accept failures are logged and skipped.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(peer = %peer, "Accepted connection");
                        tokio::spawn(handle_connection(stream, Arc::clone(&state)));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                }
            }
            () = &mut shutdown => {
                info!("Server stopped accepting connections");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_connection(stream: TcpStream, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let service = ServiceBuilder::new()
        .layer(RequestLoggerLayer)
        .service_fn(move |request: Request<Incoming>| {
            let state = Arc::clone(&state);
            async move { Ok::<_, Infallible>(routes::route(request, state).await) }
        });

    if let Err(e) = http1::Builder::new()
        .serve_connection(io, TowerToHyperService::new(service))
        .await
    {
        debug!(error = %e, "Connection closed with error");
    }
}
