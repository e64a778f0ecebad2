//! API error types.
//!
//! Every variant maps to an HTTP status and a JSON body.  The enum
//! implements [`axum::response::IntoResponse`] so handlers can simply
//! return `Err(ApiError::NotFound { .. })`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex::encode(bytes).to_uppercase()
}

/// Structured error body returned for 400, 404 and 500 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status code.
    #[schema(example = 400)]
    pub code: u16,
    /// Human-readable description.
    #[schema(example = "Bad Request")]
    pub message: String,
}

/// Body returned when the shared-secret check fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnauthorizedBody {
    #[schema(example = "Unauthorized")]
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or incorrect `X-API-Custom-Key` header.
    #[error("Unauthorized")]
    Unauthorized,

    /// Path parameter or request body failed validation.
    #[error("{message}")]
    Validation { message: String },

    /// No todo with the requested id.
    #[error("Todo not found")]
    NotFound { id: String },

    /// Catch-all for store and other unexpected failures.
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    /// Return the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Unauthorized => {
                return (
                    status,
                    Json(UnauthorizedBody {
                        error: self.to_string(),
                    }),
                )
                    .into_response();
            }
            ApiError::NotFound { id } => debug!(%id, "todo not found"),
            ApiError::Internal(err) => error!(error = ?err, "request failed"),
            ApiError::Validation { message } => debug!(%message, "validation failed"),
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_unauthorized_body() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Unauthorized"})
        );
    }

    #[tokio::test]
    async fn test_validation_body() {
        let response = ApiError::validation("title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"code": 400, "message": "title is required"})
        );
    }

    #[tokio::test]
    async fn test_internal_hides_cause() {
        let response = ApiError::Internal(anyhow::anyhow!("dynamodb exploded")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Internal Server Error");
    }
}
