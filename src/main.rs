//! Arbiter HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use arbiter::cache::FactStore;
use arbiter::config::Config;
use arbiter::gateway::{AppState, create_router_with_state};
use arbiter::orchestrator::Orchestrator;
use arbiter::retrieval::{HttpRetriever, PassthroughReranker, Retriever, StaticRetriever};
use arbiter::solver::SolverPool;
use arbiter::transport::{ChatTransport, HttpExchange, RetryingTransport, StubTransport};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        llm_stub = config.llm_stub,
        tau = config.evidence_tau,
        "Arbiter starting"
    );

    let facts = Arc::new(FactStore::open(config.storage_path.clone())?);

    let transport: Arc<dyn ChatTransport> = if config.llm_stub {
        tracing::warn!("LLM stub enabled, every answer will be refused");
        Arc::new(StubTransport::new())
    } else {
        let exchange = HttpExchange::new(config.llm_endpoint.clone(), config.llm_api_key.clone());
        Arc::new(RetryingTransport::new(exchange, config.retry_policy()))
    };

    let retriever: Arc<dyn Retriever> = match &config.retrieval_url {
        Some(url) => Arc::new(HttpRetriever::new(url.clone())),
        None => {
            tracing::warn!("No ARBITER_RETRIEVAL_URL configured, queries will have no context");
            Arc::new(StaticRetriever::empty())
        }
    };

    let orchestrator = Orchestrator::new(
        Arc::clone(&facts),
        retriever,
        Arc::new(PassthroughReranker),
        SolverPool::new(transport, config.solver_config()),
        config.pipeline_config(),
    );

    let state = AppState::new(Arc::new(orchestrator))
        .with_storage_path(config.storage_path.clone())
        .with_max_query_tokens(config.max_query_tokens)
        .with_llm_stub(config.llm_stub)
        .with_retrieval_configured(config.retrieval_url.is_some());

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = facts.stats();
    tracing::info!(
        facts = stats.count,
        total_accesses = stats.total_accesses,
        "Arbiter shutdown complete"
    );
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("ARBITER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
