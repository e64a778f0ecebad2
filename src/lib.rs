//! Todo API library: serverless Todo CRUD service.
//!
//! This crate provides the components shared by the three binaries: the
//! HTTP router with shared-secret auth and request validation, the todo
//! store backends (in-memory and DynamoDB), and the CloudFront
//! content-hash edge handler.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod edge;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod store;
pub mod validation;

use tracing::info;

use crate::config::Config;
use crate::store::backend::TodoStore;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Service configuration, fixed at startup.
    pub config: Config,
    /// Todo store (in-memory or DynamoDB).
    pub store: Arc<dyn TodoStore>,
}

/// Construct the todo store selected by `config.store.backend`.
pub async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn TodoStore>> {
    match config.store.backend.as_str() {
        "memory" => {
            info!("In-memory todo store initialized");
            Ok(Arc::new(store::memory::MemoryTodoStore::new()))
        }
        "dynamodb" => {
            let dynamo = &config.store.dynamodb;
            let backend = store::dynamodb::DynamoDbTodoStore::new(dynamo).await?;
            info!(
                "DynamoDB todo store initialized: table={} region={}",
                dynamo.table_name,
                dynamo.region.as_deref().unwrap_or("<default>")
            );
            Ok(Arc::new(backend))
        }
        other => Err(anyhow::anyhow!("unknown store backend '{other}'")),
    }
}
