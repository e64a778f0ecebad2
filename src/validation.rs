//! Request validation.
//!
//! One pure function per operation turns raw path/body input into a typed
//! value or an [`ApiError::Validation`].  Handlers call these before any
//! store access, so malformed input never reaches persistence.
//!
//! Bodies are parsed as loose JSON objects: unknown keys are ignored and an
//! explicit `null` on an optional field counts as absent.

use garde::Validate;
use serde_json::{Map, Value};

use crate::errors::ApiError;
use crate::store::backend::{CreateTodo, UpdateTodo};

/// Validated `{id}` path parameter.
#[derive(Debug, Clone, Validate)]
pub struct TodoParams {
    #[garde(length(min = 1, max = 1024))]
    pub id: String,
}

/// Validate the `{id}` path parameter.
pub fn validate_params(id: &str) -> Result<TodoParams, ApiError> {
    let params = TodoParams { id: id.to_string() };
    params
        .validate()
        .map_err(|report| ApiError::validation(report.to_string().trim().to_string()))?;
    Ok(params)
}

/// Validate a create request body: `{title: string, completed?: boolean}`.
pub fn validate_create(body: &[u8]) -> Result<CreateTodo, ApiError> {
    let object = parse_object(body)?;

    let title = match object.get("title") {
        Some(Value::String(title)) => title.clone(),
        Some(other) => return Err(type_error("title", "string", other)),
        None => return Err(ApiError::validation("title: Required")),
    };
    let completed = optional_bool(&object, "completed")?.unwrap_or(false);

    Ok(CreateTodo { title, completed })
}

/// Validate an update request body: `{title?: string, completed?: boolean}`.
pub fn validate_update(body: &[u8]) -> Result<UpdateTodo, ApiError> {
    let object = parse_object(body)?;

    Ok(UpdateTodo {
        title: optional_string(&object, "title")?,
        completed: optional_bool(&object, "completed")?,
    })
}

/// Parse `body` as a JSON object. An empty body is an empty object.
fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(ApiError::validation(format!(
            "Expected object, received {}",
            json_type(&other)
        ))),
        Err(err) => Err(ApiError::validation(format!("Malformed JSON in request body: {err}"))),
    }
}

fn optional_string(object: &Map<String, Value>, field: &str) -> Result<Option<String>, ApiError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_error(field, "string", other)),
    }
}

fn optional_bool(object: &Map<String, Value>, field: &str) -> Result<Option<bool>, ApiError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(field, "boolean", other)),
    }
}

fn type_error(field: &str, expected: &str, received: &Value) -> ApiError {
    ApiError::validation(format!(
        "{field}: Expected {expected}, received {}",
        json_type(received)
    ))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
