//! Error response formatting
//!
//! Standardized JSON error bodies with consistent status codes, machine
//! readable error codes, and user-facing messages.

use crate::error::{AppError, ErrorCode};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Standardized error response structure returned for all error cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Request ID for debugging and support
    pub request_id: Option<String>,

    /// ISO 8601 timestamp of the error
    pub timestamp: String,

    /// Whether the client should retry the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError, request_id: Option<String>) -> Self {
        Self {
            error: error.error_code(),
            message: error.user_message(),
            request_id,
            timestamp: Utc::now().to_rfc3339(),
            retryable: Some(error.is_retryable()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = ?self, status = %status.as_u16(), "server error occurred");
        } else {
            tracing::warn!(error = ?self, status = %status.as_u16(), "request failed");
        }

        let body = ErrorResponse::from_app_error(&self, None);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::BankError;

    #[test]
    fn error_response_carries_code_and_message() {
        let err = AppError::from(BankError::ServiceUnavailable);
        let body = ErrorResponse::from_app_error(&err, Some("req_123".to_string()));

        assert_eq!(body.error, ErrorCode::Bank);
        assert_eq!(body.message, "Payment service unavailable");
        assert_eq!(body.request_id.as_deref(), Some("req_123"));
        assert_eq!(body.retryable, Some(true));
    }

    #[test]
    fn unauthorized_maps_to_401_response() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bank_failure_maps_to_400_response() {
        let response = AppError::from(BankError::NullResponse).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
