//! Bank gateway integration
//!
//! HTTP client for the acquiring bank's authorization endpoint with bounded
//! retry and a process-wide circuit breaker in front of the wire.

pub mod circuit;
pub mod client;
pub mod error;
pub mod types;

pub use circuit::{CircuitBreaker, CircuitState};
pub use client::{BankClient, BankGatewayClient};
pub use error::{BankError, BankResult};
pub use types::{BankPaymentRequest, BankPaymentResponse};
