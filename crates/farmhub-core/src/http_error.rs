//! Maps domain `AppError` to HTTP responses.
//!
//! Every error body shares one envelope so clients can branch on
//! `error.code` rather than parsing messages. Store-level details are
//! logged server-side and never serialized.
//!
//! This mapping lives in `farmhub-core` (alongside `AppError`) because the
//! orphan rule only permits `impl IntoResponse for AppError` in the crate
//! that defines `AppError` or the crate that defines `IntoResponse`.

use axum::Json;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ErrorKind};

/// Standard error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always false.
    pub success: bool,
    /// The error payload.
    pub error: ApiErrorBody,
    /// Correlation ID, echoed in the `x-request-id` response header.
    pub request_id: String,
}

/// The inner error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// When the error was produced (RFC 3339).
    pub timestamp: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.kind {
            ErrorKind::Validation => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.message.clone(),
            ),
            ErrorKind::DuplicateUser => {
                (StatusCode::CONFLICT, "DUPLICATE_USER", self.message.clone())
            }
            ErrorKind::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.message.clone(),
            ),
            ErrorKind::LockedOut => (
                StatusCode::TOO_MANY_REQUESTS,
                "LOCKED_OUT",
                self.message.clone(),
            ),
            // One message for every unauthorized path: callers must not be
            // able to tell an expired token from a revoked one.
            ErrorKind::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.message.clone()),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.message.clone()),
            ErrorKind::Database | ErrorKind::Configuration | ErrorKind::Internal => {
                tracing::error!(error = %self, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let request_id = Uuid::new_v4().to_string();

        let body = ApiErrorResponse {
            success: false,
            error: ApiErrorBody {
                code: code.to_string(),
                message,
                details: None,
                timestamp: Utc::now().to_rfc3339(),
            },
            request_id: request_id.clone(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), value);
        }
        response
    }
}
