//! HTTP middleware: API-key authorization and error response formatting.

pub mod auth;
pub mod error;
