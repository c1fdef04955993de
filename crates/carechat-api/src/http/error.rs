//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use carechat_types::error::StoreError;
use carechat_types::registration::FieldErrors;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Registration rejected; carries every failing field.
    Registration(FieldErrors),
    /// Chat log store errors.
    Store(StoreError),
    /// Requested resource does not exist.
    NotFound(String),
    /// Malformed request outside registration.
    Validation(String),
}

impl From<FieldErrors> for AppError {
    fn from(e: FieldErrors) -> Self {
        AppError::Registration(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl AppError {
    /// Status, machine code, message, and optional details for the envelope.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Registration(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Registration rejected".to_string(),
                serde_json::to_value(errors).ok(),
            ),
            AppError::Store(e @ StoreError::Validation(missing)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
                Some(json!({ "missing": missing })),
            ),
            AppError::Store(e @ StoreError::Lifecycle(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                e.to_string(),
                None,
            ),
            AppError::Store(e @ StoreError::PoolTimeout) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "POOL_TIMEOUT",
                e.to_string(),
                None,
            ),
            AppError::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                e.to_string(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, "request failed: {message}");
        }

        let body = ApiResponse::error(code, &message, details, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
