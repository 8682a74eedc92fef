//! Database error types

use crate::encryption::CryptoError;
use std::fmt;

#[derive(Debug, Clone)]
pub enum DatabaseErrorKind {
    /// Connection or pool acquisition failure.
    Connection { message: String },
    /// A uniqueness constraint rejected the write (duplicate-id race).
    UniqueViolation { constraint: Option<String> },
    /// The requested row does not exist.
    NotFound { entity: String, id: String },
    /// A protected column could not be decoded.
    Corrupt { message: String },
    Unknown { message: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseError {
    pub kind: DatabaseErrorKind,
}

impl DatabaseError {
    pub fn new(kind: DatabaseErrorKind) -> Self {
        Self { kind }
    }

    pub fn from_sqlx(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseErrorKind::UniqueViolation {
                    constraint: db_err.constraint().map(|c| c.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseErrorKind::Connection {
                    message: err.to_string(),
                }
            }
            sqlx::Error::RowNotFound => DatabaseErrorKind::NotFound {
                entity: "row".to_string(),
                id: String::new(),
            },
            _ => DatabaseErrorKind::Unknown {
                message: err.to_string(),
            },
        };
        Self::new(kind)
    }

    /// Conflicts and connection failures are safe to retry; the rest are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::Connection { .. } | DatabaseErrorKind::UniqueViolation { .. }
        )
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DatabaseErrorKind::Connection { message } => {
                write!(f, "Database connection error: {}", message)
            }
            DatabaseErrorKind::UniqueViolation { constraint } => match constraint {
                Some(constraint) => write!(f, "Unique constraint violated: {}", constraint),
                None => write!(f, "Unique constraint violated"),
            },
            DatabaseErrorKind::NotFound { entity, id } => {
                write!(f, "{} '{}' not found", entity, id)
            }
            DatabaseErrorKind::Corrupt { message } => {
                write!(f, "Stored data could not be decoded: {}", message)
            }
            DatabaseErrorKind::Unknown { message } => write!(f, "Database error: {}", message),
        }
    }
}

impl std::error::Error for DatabaseError {}

impl From<CryptoError> for DatabaseError {
    fn from(err: CryptoError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Corrupt {
            message: err.to_string(),
        })
    }
}
