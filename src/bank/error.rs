use thiserror::Error;

pub type BankResult<T> = Result<T, BankError>;

/// Failures surfaced by the bank gateway client. The client never lets an
/// unexpected error escape; everything maps into one of these.
#[derive(Debug, Clone, Error)]
pub enum BankError {
    /// The bank reported 503, before or after retries were exhausted.
    #[error("Payment service unavailable")]
    ServiceUnavailable,

    /// The circuit is open; the call never reached the wire.
    #[error("Payment service unavailable")]
    CircuitOpen,

    /// The bank answered 2xx but the body was empty or not decodable.
    #[error("Payment response returned null")]
    NullResponse,

    /// Transient transport failure: connect errors, timeouts, non-503 5xx.
    #[error("Something went wrong")]
    Transient { message: String },

    /// Anything else. Logged with detail, reported generically.
    #[error("Something went wrong")]
    Unexpected { message: String },
}

impl BankError {
    pub fn is_retryable(&self) -> bool {
        match self {
            BankError::ServiceUnavailable => true,
            BankError::Transient { .. } => true,
            BankError::CircuitOpen => false,
            BankError::NullResponse => false,
            BankError::Unexpected { .. } => false,
        }
    }
}
