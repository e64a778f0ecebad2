//! Axum router construction and middleware stack.
//!
//! The [`app`] function wires the Todo routes, the OpenAPI document and
//! Swagger UI, and the infrastructure endpoints, and returns a
//! ready-to-serve [`axum::Router`].  The same router backs both the
//! standalone server and the Lambda entry point.

use axum::{
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::API_KEY_HEADER;
use crate::errors::{generate_request_id, ApiError, ErrorBody, UnauthorizedBody};
use crate::handlers::todos::{self, DeleteConfirmation};
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::store::backend::{CreateTodo, Todo, UpdateTodo};
use crate::AppState;

// -- OpenAPI specification ----------------------------------------------------

/// OpenAPI documentation for the Todo API, served at `/doc`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Todo API", version = "1.0.0"),
    paths(
        health_check,
        todos::list_todos,
        todos::get_todo,
        todos::create_todo,
        todos::update_todo,
        todos::delete_todo,
    ),
    components(schemas(
        Todo,
        CreateTodo,
        UpdateTodo,
        ErrorBody,
        UnauthorizedBody,
        DeleteConfirmation
    )),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Todos", description = "Todo CRUD operations"),
    )
)]
pub struct ApiDoc;

/// Declares the `X-API-Custom-Key` header as the `api_key` security scheme.
struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

/// Build the axum [`Router`] with all routes and layers.
pub fn app(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        // Swagger UI at /ui, OpenAPI document at /doc.
        .merge(SwaggerUi::new("/ui").url("/doc", ApiDoc::openapi()))
        .route("/health", get(health_check));

    if state.config.observability.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .with_state(state.clone())
        // Layer ordering: the last layer added is the outermost.
        // auth_middleware is innermost (closest to handlers).
        .layer(middleware::from_fn_with_state(state, auth_middleware))
        .layer(middleware::from_fn(request_log_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(common_headers_middleware))
}

// -- Common headers middleware -----------------------------------------------

/// Adds `x-request-id`, `date` and `server` to every response.
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if !headers.contains_key("x-request-id") {
        if let Ok(value) = HeaderValue::from_str(&generate_request_id()) {
            headers.insert("x-request-id", value);
        }
    }
    if let Ok(date) = HeaderValue::from_str(&httpdate::fmt_http_date(std::time::SystemTime::now()))
    {
        headers.insert("date", date);
    }
    headers.insert("server", HeaderValue::from_static("todo-api"));

    response
}

// -- Request logging ---------------------------------------------------------

/// One structured log event per request: method, path, status, elapsed time.
async fn request_log_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms,
        "request completed"
    );

    response
}

// -- Auth middleware ---------------------------------------------------------

/// Paths that bypass the shared-secret check.
const AUTH_SKIP_PATHS: &[&str] = &["/health", "/metrics"];

/// Shared-secret middleware.
///
/// Rejects the request with 401 before it reaches the router unless
/// `X-API-Custom-Key` matches the configured secret.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();

    if AUTH_SKIP_PATHS.iter().any(|skip| path == *skip) {
        return Ok(next.run(req).await);
    }

    if let Err(err) = auth::check_api_key(req.headers(), &state.config.auth.api_key) {
        warn!(method = %req.method(), %path, "rejected request: missing or invalid API key");
        return Err(err);
    }

    Ok(next.run(req).await)
}

// -- Health check ------------------------------------------------------------

/// `GET /health` -- Returns `{"status": "ok"}` with 200 OK.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "HealthCheck",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        r#"{"status":"ok"}"#,
    )
}
