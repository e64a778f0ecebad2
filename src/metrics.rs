//! Prometheus metrics for the Todo API.
//!
//! Installs a global Prometheus recorder using `metrics-exporter-prometheus`,
//! defines metric name constants, provides an axum middleware for HTTP RED
//! metrics, and exposes the `/metrics` endpoint handler.

use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

// -- Metric name constants ----------------------------------------------------

/// Total HTTP requests (counter). Labels: method, path, status.
pub const HTTP_REQUESTS_TOTAL: &str = "todo_api_http_requests_total";

/// HTTP request duration in seconds (histogram). Labels: method, path.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "todo_api_http_request_duration_seconds";

/// Total todo operations (counter). Labels: operation, outcome.
pub const TODO_OPERATIONS_TOTAL: &str = "todo_api_operations_total";

// -- Global recorder installation ---------------------------------------------

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus metrics recorder. Idempotent -- safe to call
/// multiple times (e.g. in tests).
pub fn init_metrics() -> &'static PrometheusHandle {
    PROMETHEUS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    })
}

/// Register metric descriptions with the global recorder.
pub fn describe_metrics() {
    describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests");
    describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
    describe_counter!(TODO_OPERATIONS_TOTAL, "Total todo operations by type and outcome");
}

/// Record the outcome of one todo operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    counter!(TODO_OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
}

// -- Metrics middleware -------------------------------------------------------

/// Axum middleware that records HTTP RED metrics for every request.
///
/// Excludes `/metrics` from self-instrumentation.
pub async fn metrics_middleware(
    req: Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Response {
    if req.uri().path() == "/metrics" {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let start = Instant::now();
    let response = next.run(req).await;
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "path" => path).record(duration);

    response
}

// -- Path normalization -------------------------------------------------------

/// Normalize a request path to a route template for metric labels.
///
/// - `/todos` -> `/todos`
/// - `/todos/abc` -> `/todos/{id}`
/// - `/ui/index.css` -> `/ui`
/// - anything unrouted -> `other`
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "" => "/".to_string(),
        "/todos" | "/doc" | "/ui" | "/health" | "/metrics" => trimmed.to_string(),
        _ if trimmed.starts_with("/ui/") => "/ui".to_string(),
        _ => match trimmed.strip_prefix("/todos/") {
            Some(rest) if !rest.contains('/') => "/todos/{id}".to_string(),
            _ => "other".to_string(),
        },
    }
}

// -- Metrics endpoint handler -------------------------------------------------

/// `GET /metrics` -- Render Prometheus exposition format text.
pub async fn metrics_handler() -> Response {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
