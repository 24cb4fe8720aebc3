//! API Error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use capacity_core::StoreError;
use serde::Serialize;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage failure; carries only the action description
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a store error for a handler. Storage details are logged and
    /// replaced by `action` in the response.
    pub fn store(action: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |err| match err {
            StoreError::NotFound { kind, .. } => ApiError::NotFound(format!("{} not found", kind)),
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::Storage(detail) => {
                tracing::error!(error = %detail, "{}", action);
                ApiError::Internal(action.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use capacity_core::EntityKind;

    #[test]
    fn test_store_error_mapping() {
        let err = ApiError::store("Failed to fetch project")(StoreError::not_found(
            EntityKind::Project,
            "p1",
        ));
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Project not found"));

        let err = ApiError::store("Failed to create project")(StoreError::Storage(
            "UNIQUE constraint failed: projects.id".to_string(),
        ));
        assert!(matches!(err, ApiError::Internal(ref m) if m == "Failed to create project"));

        let err = ApiError::store("Failed to create project")(StoreError::validation("bad"));
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".to_string()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Validation("x".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
