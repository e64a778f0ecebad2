//! Shared-secret header authentication.
//!
//! Every API request must carry `X-API-Custom-Key` equal to the configured
//! secret.  Comparison is exact and constant-time.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::config::API_KEY_HEADER;
use crate::errors::ApiError;

/// Constant-time string equality.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the shared-secret header against `expected`.
///
/// A missing header, a non-UTF-8 value, a mismatch, or an empty `expected`
/// all yield [`ApiError::Unauthorized`].
pub fn check_api_key(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    if expected.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if constant_time_eq(provided, expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
