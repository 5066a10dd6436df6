// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::manager::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages.
/// Every variant serializes to the `{"status": "Failed", "error": ...}` wire
/// body; store internals are logged, never exposed.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request (malformed or invalid input field)
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error (any store failure, generic message)
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to the JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "status": "Failed",
            "error": self.message(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Map a store error to its API shape: not-found stays visible, anything
    /// else is logged and replaced by the operation's generic message.
    pub fn from_store(err: StoreError, public_message: &str) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::internal_server_error(public_message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::internal_server_error("x").status_code(), 500);
    }

    #[test]
    fn json_body_uses_failed_envelope() {
        let body = ApiError::bad_request("Invalid mobile number.").to_json();
        assert_eq!(body["status"], "Failed");
        assert_eq!(body["error"], "Invalid mobile number.");
    }

    #[test]
    fn store_not_found_stays_visible() {
        let err = ApiError::from_store(
            StoreError::NotFound("User not found.".into()),
            "An error occurred while updating users.",
        );
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "User not found.");
    }

    #[test]
    fn store_internals_are_masked() {
        let err = ApiError::from_store(
            StoreError::ConfigMissing("DATABASE_URL"),
            "An error occurred while updating users.",
        );
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "An error occurred while updating users.");
    }
}
