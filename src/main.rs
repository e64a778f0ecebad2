//! Todo API -- standalone HTTP server.
//!
//! Serves the same router the Lambda entry point wraps. SIGTERM/SIGINT
//! stop accepting connections and wait up to `server.shutdown_timeout`
//! seconds for in-flight requests.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use todo_api::config::Config;

/// Command-line arguments for the Todo API server.
#[derive(Parser, Debug)]
#[command(name = "todo-api", version, about = "Todo CRUD API server")]
struct Cli {
    /// Path to a YAML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => todo_api::config::load_config(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());

    todo_api::logging::init_tracing(&config.logging);
    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path);
    }
    config.validate()?;

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    if config.observability.metrics {
        todo_api::metrics::init_metrics();
        todo_api::metrics::describe_metrics();
        info!("Prometheus metrics initialized");
    }

    let store = todo_api::build_store(&config).await?;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);

    let state = Arc::new(todo_api::AppState { config, store });
    let app = todo_api::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Todo API listening on {}", bind_addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    let mut server = std::pin::pin!(server.into_future());

    tokio::select! {
        result = &mut server => result?,
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            warn!("Shutdown timeout of {:?} elapsed; exiting with requests in flight", shutdown_timeout);
        }
    }

    info!("Todo API shut down");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
