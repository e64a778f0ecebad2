//! Todo CRUD handlers.
//!
//! Each handler validates its path/body input, makes exactly one logical
//! store call, and maps the result to a JSON response.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::errors::{ApiError, ErrorBody, UnauthorizedBody};
use crate::metrics::record_operation;
use crate::store::backend::{CreateTodo, Todo, UpdateTodo};
use crate::validation::{validate_create, validate_params, validate_update};
use crate::AppState;

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteConfirmation {
    #[schema(example = "Todo deleted successfully")]
    pub message: String,
}

/// Count the operation's outcome, then pass the result through.
fn track<T>(operation: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(ApiError::NotFound { .. }) => "not_found",
        Err(ApiError::Validation { .. }) => "invalid",
        Err(_) => "error",
    };
    record_operation(operation, outcome);
    result
}

/// `GET /todos` -- ListTodos
#[utoipa::path(
    get,
    path = "/todos",
    tag = "Todos",
    operation_id = "ListTodos",
    responses(
        (status = 200, description = "List all todos", body = [Todo]),
        (status = 401, description = "Missing or wrong API key", body = UnauthorizedBody)
    ),
    security(("api_key" = []))
)]
pub async fn list_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, ApiError> {
    track("list", list_inner(&state).await)
}

async fn list_inner(state: &AppState) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.store.list_all().await?;
    debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

/// `GET /todos/{id}` -- GetTodo
#[utoipa::path(
    get,
    path = "/todos/{id}",
    tag = "Todos",
    operation_id = "GetTodo",
    params(("id" = String, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Get a todo by ID", body = Todo),
        (status = 404, description = "Todo not found", body = ErrorBody),
        (status = 401, description = "Missing or wrong API key", body = UnauthorizedBody)
    ),
    security(("api_key" = []))
)]
pub async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    track("get", get_inner(&state, &id).await)
}

async fn get_inner(state: &AppState, id: &str) -> Result<Json<Todo>, ApiError> {
    let params = validate_params(id)?;
    match state.store.get_by_id(&params.id).await? {
        Some(todo) => Ok(Json(todo)),
        None => Err(ApiError::NotFound { id: params.id }),
    }
}

/// `POST /todos` -- CreateTodo
#[utoipa::path(
    post,
    path = "/todos",
    tag = "Todos",
    operation_id = "CreateTodo",
    request_body(content = CreateTodo, content_type = "application/json"),
    responses(
        (status = 201, description = "Todo created successfully", body = Todo),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 401, description = "Missing or wrong API key", body = UnauthorizedBody)
    ),
    security(("api_key" = []))
)]
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    track("create", create_inner(&state, &body).await)
}

async fn create_inner(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let new_todo = validate_create(body)?;
    let todo = state.store.create(new_todo).await?;
    info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)).into_response())
}

/// `PUT /todos/{id}` -- UpdateTodo
#[utoipa::path(
    put,
    path = "/todos/{id}",
    tag = "Todos",
    operation_id = "UpdateTodo",
    params(("id" = String, Path, description = "Todo id")),
    request_body(content = UpdateTodo, content_type = "application/json"),
    responses(
        (status = 200, description = "Todo updated successfully", body = Todo),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 404, description = "Todo not found", body = ErrorBody),
        (status = 401, description = "Missing or wrong API key", body = UnauthorizedBody)
    ),
    security(("api_key" = []))
)]
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    track("update", update_inner(&state, &id, &body).await)
}

async fn update_inner(state: &AppState, id: &str, body: &[u8]) -> Result<Json<Todo>, ApiError> {
    let params = validate_params(id)?;
    let update = validate_update(body)?;
    match state.store.update_by_id(&params.id, update).await? {
        Some(todo) => {
            info!(id = %todo.id, "updated todo");
            Ok(Json(todo))
        }
        None => Err(ApiError::NotFound { id: params.id }),
    }
}

/// `DELETE /todos/{id}` -- DeleteTodo
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    tag = "Todos",
    operation_id = "DeleteTodo",
    params(("id" = String, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo deleted successfully", body = DeleteConfirmation),
        (status = 404, description = "Todo not found", body = ErrorBody),
        (status = 401, description = "Missing or wrong API key", body = UnauthorizedBody)
    ),
    security(("api_key" = []))
)]
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    track("delete", delete_inner(&state, &id).await)
}

async fn delete_inner(state: &AppState, id: &str) -> Result<Json<DeleteConfirmation>, ApiError> {
    let params = validate_params(id)?;
    if !state.store.delete_by_id(&params.id).await? {
        return Err(ApiError::NotFound { id: params.id });
    }
    info!(id = %params.id, "deleted todo");
    Ok(Json(DeleteConfirmation {
        message: "Todo deleted successfully".to_string(),
    }))
}
