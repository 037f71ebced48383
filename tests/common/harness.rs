//! Test server harness.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arbiter::cache::FactStore;
use arbiter::gateway::{AppState, create_router_with_state};
use arbiter::orchestrator::{Orchestrator, PipelineConfig};
use arbiter::retrieval::{PassthroughReranker, Retriever, StaticRetriever};
use arbiter::solver::{SolverConfig, SolverPool};
use arbiter::transport::{ChatTransport, ScriptedTransport};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub struct TestServerConfig {
    pub storage_path: Option<PathBuf>,
    pub transport: Arc<dyn ChatTransport>,
    pub retriever: Arc<dyn Retriever>,
    pub pipeline: PipelineConfig,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            transport: Arc::new(ScriptedTransport::always(fixtures::confident_reply())),
            retriever: Arc::new(StaticRetriever::new(fixtures::chunks())),
            pipeline: PipelineConfig::default(),
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub storage_path: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => tokio::time::sleep(interval).await,
        }
    }
}

/// Spawns the full router over a disk-backed fact store with scripted collaborators.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let (storage_path, _temp_dir) = match config.storage_path {
        Some(path) => (path, None),
        None => {
            let temp_dir =
                TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
            (temp_dir.path().join("facts"), Some(temp_dir))
        }
    };

    let facts = FactStore::open(storage_path.clone())
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let orchestrator = Orchestrator::new(
        Arc::new(facts),
        config.retriever,
        Arc::new(PassthroughReranker),
        SolverPool::new(config.transport, SolverConfig::default()),
        config.pipeline,
    );

    let state = AppState::new(Arc::new(orchestrator))
        .with_storage_path(storage_path.clone())
        .with_retrieval_configured(true);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        storage_path,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir,
    })
}

/// Serves `body` from `POST /search` and returns the base URL.
pub async fn spawn_search_service(body: serde_json::Value) -> String {
    let app = axum::Router::new().route(
        "/search",
        axum::routing::post(move || {
            let body = body.clone();
            async move { axum::Json(body) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
