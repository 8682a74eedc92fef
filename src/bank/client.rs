use crate::bank::circuit::{CircuitBreaker, CircuitState};
use crate::bank::error::{BankError, BankResult};
use crate::bank::types::{BankPaymentRequest, BankPaymentResponse};
use crate::config::BankClientConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// The authorization seam towards the bank.
#[async_trait]
pub trait BankClient: Send + Sync {
    async fn send_payment(&self, request: &BankPaymentRequest)
        -> BankResult<BankPaymentResponse>;
}

/// HTTP client for the bank's authorization endpoint.
///
/// Transient failures (connect errors, timeouts, 5xx) are retried with
/// exponential backoff up to the configured attempt budget. The circuit
/// breaker sits in front of every attempt; while it is open no request
/// reaches the wire. Dropping the returned future cancels any remaining
/// attempts, and since persistence happens only after a successful response,
/// a cancelled call leaves no partial record behind.
pub struct BankGatewayClient {
    client: Client,
    payments_url: String,
    max_attempts: u32,
    breaker: Arc<CircuitBreaker>,
}

impl BankGatewayClient {
    pub fn new(config: &BankClientConfig) -> BankResult<Self> {
        let base_url = config
            .primary_base_url()
            .map_err(|e| BankError::Unexpected {
                message: e.to_string(),
            })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BankError::Unexpected {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            payments_url: format!("{}/payments", base_url),
            max_attempts: config.max_attempts.max(1),
            breaker: Arc::new(CircuitBreaker::new(
                config.breaker_threshold,
                config.breaker_cooldown(),
            )),
        })
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }
}

#[async_trait]
impl BankClient for BankGatewayClient {
    /// Submit one payment for authorization.
    async fn send_payment(
        &self,
        request: &BankPaymentRequest,
    ) -> BankResult<BankPaymentResponse> {
        let mut last_error = BankError::Unexpected {
            message: "bank request failed".to_string(),
        };

        for attempt in 0..self.max_attempts {
            if !self.breaker.allow_request() {
                warn!(attempt = attempt + 1, "circuit open, rejecting bank call");
                return Err(BankError::CircuitOpen);
            }

            match self.attempt(request).await {
                Ok(response) => {
                    self.breaker.record_success();
                    return Ok(response);
                }
                Err(err) if err.is_retryable() => {
                    self.breaker.record_failure();
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "bank request failed, retrying"
                    );
                    last_error = err;
                    if attempt + 1 < self.max_attempts {
                        tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        error!(error = %last_error, "bank request retries exhausted");
        Err(last_error)
    }
}

impl BankGatewayClient {
    async fn attempt(&self, request: &BankPaymentRequest) -> BankResult<BankPaymentResponse> {
        let response = self
            .client
            .post(&self.payments_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    BankError::Transient {
                        message: e.to_string(),
                    }
                } else {
                    error!(error = %e, "issue sending payment request");
                    BankError::Unexpected {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(BankError::ServiceUnavailable);
        }

        if status.is_server_error() {
            return Err(BankError::Transient {
                message: format!("HTTP {}", status),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "unexpected bank response");
            return Err(BankError::Unexpected {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Err(BankError::NullResponse);
        }

        serde_json::from_str::<BankPaymentResponse>(&body).map_err(|e| {
            warn!(error = %e, "bank response body not decodable");
            BankError::NullResponse
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockBankClient {
        authorized: bool,
    }

    #[async_trait]
    impl BankClient for MockBankClient {
        async fn send_payment(
            &self,
            _request: &BankPaymentRequest,
        ) -> BankResult<BankPaymentResponse> {
            Ok(BankPaymentResponse {
                authorized: self.authorized,
                authorization_code: self.authorized.then(|| "mock-code".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn trait_can_be_implemented_by_mock_client() {
        let client: Box<dyn BankClient> = Box::new(MockBankClient { authorized: true });
        let response = client
            .send_payment(&BankPaymentRequest {
                card_number: "2222405343248877".to_string(),
                expiry_date: "4/2027".to_string(),
                cvv: "123".to_string(),
                amount: 100,
                currency: "GBP".to_string(),
            })
            .await
            .expect("mock authorization should succeed");

        assert!(response.authorized);
        assert_eq!(response.authorization_code.as_deref(), Some("mock-code"));
    }
}
