//! Unified error handling
//!
//! Layer-specific errors (bank, database, crypto, config) roll up into
//! [`AppError`], which owns the HTTP mapping: authorization failures are
//! 401, every other pipeline failure below the HTTP layer is 400. Rejected
//! payments are not errors at all; they travel the success path.

use crate::bank::BankError;
use crate::database::error::DatabaseError;
use crate::encryption::CryptoError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error codes for client handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized,
    #[serde(rename = "BANK_ERROR")]
    Bank,
    #[serde(rename = "DATABASE_ERROR")]
    Database,
    #[serde(rename = "ENCRYPTION_ERROR")]
    Encryption,
    #[serde(rename = "CONFIGURATION_ERROR")]
    Configuration,
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
}

/// Unified application error type
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing or invalid API key. Short-circuits before any processing.
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Bank(#[from] BankError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Malformed caller input outside the validation-rule pipeline
    /// (for example an unparseable payment id).
    #[error("{message}")]
    InvalidRequest { message: String },
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Unauthorized => 401,
            _ => 400,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Bank(_) => ErrorCode::Bank,
            AppError::Database(_) => ErrorCode::Database,
            AppError::Crypto(_) => ErrorCode::Encryption,
            AppError::Configuration { .. } => ErrorCode::Configuration,
            AppError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// User-facing message. Internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Bank(err) => err.to_string(),
            AppError::Database(_) => "Payment could not be recorded".to_string(),
            AppError::Crypto(_) => "Payment could not be recorded".to_string(),
            AppError::Configuration { .. } => "Service misconfigured".to_string(),
            AppError::InvalidRequest { message } => message.clone(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Unauthorized => false,
            AppError::Bank(err) => err.is_retryable(),
            AppError::Database(err) => err.is_retryable(),
            AppError::Crypto(_) => false,
            AppError::Configuration { .. } => false,
            AppError::InvalidRequest { .. } => false,
        }
    }
}

/// Result type for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::error::DatabaseErrorKind;

    #[test]
    fn auth_failures_map_to_401() {
        assert_eq!(AppError::Unauthorized.status_code(), 401);
        assert!(!AppError::Unauthorized.is_retryable());
    }

    #[test]
    fn pipeline_failures_map_to_400() {
        let bank = AppError::from(BankError::ServiceUnavailable);
        assert_eq!(bank.status_code(), 400);
        assert_eq!(bank.user_message(), "Payment service unavailable");
        assert!(bank.is_retryable());

        let db = AppError::from(DatabaseError::new(DatabaseErrorKind::UniqueViolation {
            constraint: None,
        }));
        assert_eq!(db.status_code(), 400);
        assert!(db.is_retryable());
    }

    #[test]
    fn database_detail_is_not_exposed() {
        let err = AppError::from(DatabaseError::new(DatabaseErrorKind::Unknown {
            message: "relation payments does not exist".to_string(),
        }));

        assert!(!err.user_message().contains("payments"));
    }
}
