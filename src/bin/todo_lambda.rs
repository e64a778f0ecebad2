//! Todo API -- AWS Lambda entry point.
//!
//! Wraps the same axum router as the standalone server with `lambda_http`,
//! so it can sit behind a Lambda Function URL. Configuration comes from
//! the function's environment (`API_KEY`, `TODO_TABLE_NAME`, `AWS_REGION`, ...).

use std::sync::Arc;

use lambda_http::{run, Error};
use tracing::info;

use todo_api::config::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut config = Config::from_env();
    // No scrape target inside a Lambda sandbox.
    config.observability.metrics = false;

    todo_api::logging::init_tracing(&config.logging);
    config.validate()?;

    let store = todo_api::build_store(&config).await?;
    let state = Arc::new(todo_api::AppState { config, store });
    let app = todo_api::server::app(state);

    info!("Todo API Lambda handler starting");
    run(app).await
}
