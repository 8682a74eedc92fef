//! Bank gateway client tests against an in-process bank simulator.
//!
//! The simulator applies the documented rule: a card number ending in an odd
//! digit authorizes, an even non-zero digit declines, and `0` makes the call
//! fail with 503.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use cardgate_backend::bank::{
    BankClient, BankError, BankGatewayClient, BankPaymentRequest, CircuitState,
};
use cardgate_backend::config::BankClientConfig;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Default)]
struct SimulatorState {
    calls: Arc<AtomicUsize>,
}

async fn payments_endpoint(
    State(state): State<SimulatorState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let card_number = body["card_number"].as_str().unwrap_or("");
    match card_number.chars().last() {
        Some('0') => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Some(digit) if digit.to_digit(10).is_some_and(|d| d % 2 == 1) => Json(serde_json::json!({
            "authorized": true,
            "authorization_code": Uuid::new_v4().to_string(),
        }))
        .into_response(),
        _ => Json(serde_json::json!({
            "authorized": false,
            "authorization_code": null,
        }))
        .into_response(),
    }
}

async fn empty_body_endpoint(State(state): State<SimulatorState>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, "").into_response()
}

async fn start_simulator(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind simulator listener");
    let addr = listener.local_addr().expect("simulator local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve simulator");
    });
    addr
}

async fn simulator(state: SimulatorState) -> SocketAddr {
    start_simulator(
        Router::new()
            .route("/payments", post(payments_endpoint))
            .with_state(state),
    )
    .await
}

fn client_config(addr: SocketAddr, max_attempts: u32, breaker_threshold: u32) -> BankClientConfig {
    BankClientConfig {
        base_urls: vec![format!("http://{}", addr)],
        timeout_secs: 5,
        max_attempts,
        breaker_threshold,
        breaker_cooldown_secs: 60,
    }
}

fn payment_request(card_number: &str) -> BankPaymentRequest {
    BankPaymentRequest {
        card_number: card_number.to_string(),
        expiry_date: "4/2027".to_string(),
        cvv: "123".to_string(),
        amount: 100,
        currency: "GBP".to_string(),
    }
}

#[tokio::test]
async fn card_ending_in_odd_digit_is_authorized() {
    let addr = simulator(SimulatorState::default()).await;
    let client = BankGatewayClient::new(&client_config(addr, 3, 5)).unwrap();

    let response = client
        .send_payment(&payment_request("2222405343248877"))
        .await
        .unwrap();

    assert!(response.authorized);
    assert!(response.authorization_code.is_some());
}

#[tokio::test]
async fn card_ending_in_even_digit_is_declined_without_code() {
    let addr = simulator(SimulatorState::default()).await;
    let client = BankGatewayClient::new(&client_config(addr, 3, 5)).unwrap();

    let response = client
        .send_payment(&payment_request("2222405343248872"))
        .await
        .unwrap();

    assert!(!response.authorized);
    assert!(response.authorization_code.is_none());
}

#[tokio::test]
async fn service_unavailable_surfaces_distinct_failure() {
    let state = SimulatorState::default();
    let addr = simulator(state.clone()).await;
    let client = BankGatewayClient::new(&client_config(addr, 1, 5)).unwrap();

    let err = client
        .send_payment(&payment_request("2222405343248870"))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::ServiceUnavailable));
    assert_eq!(err.to_string(), "Payment service unavailable");
    assert_eq!(state.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let state = SimulatorState::default();
    let addr = simulator(state.clone()).await;
    // Attempt budget 2: one failure, one retry; threshold high enough to
    // keep the circuit closed.
    let client = BankGatewayClient::new(&client_config(addr, 2, 10)).unwrap();

    let err = client
        .send_payment(&payment_request("2222405343248870"))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::ServiceUnavailable));
    assert_eq!(state.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_response_body_is_a_null_response_failure() {
    let state = SimulatorState::default();
    let addr = start_simulator(
        Router::new()
            .route("/payments", post(empty_body_endpoint))
            .with_state(state),
    )
    .await;
    let client = BankGatewayClient::new(&client_config(addr, 3, 5)).unwrap();

    let err = client
        .send_payment(&payment_request("2222405343248877"))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::NullResponse));
    assert_eq!(err.to_string(), "Payment response returned null");
}

#[tokio::test]
async fn unreachable_bank_is_a_generic_failure() {
    // Bind then drop a listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BankGatewayClient::new(&client_config(addr, 1, 5)).unwrap();
    let err = client
        .send_payment(&payment_request("2222405343248877"))
        .await
        .unwrap_err();

    assert!(matches!(err, BankError::Transient { .. }));
    assert_eq!(err.to_string(), "Something went wrong");
}

#[tokio::test]
async fn circuit_opens_after_consecutive_failures_and_blocks_calls() {
    let state = SimulatorState::default();
    let addr = simulator(state.clone()).await;
    // Threshold 2, one attempt per call: two failing calls open the circuit.
    let client = BankGatewayClient::new(&client_config(addr, 1, 2)).unwrap();

    for _ in 0..2 {
        let err = client
            .send_payment(&payment_request("2222405343248870"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankError::ServiceUnavailable));
    }

    assert_eq!(client.circuit_state(), CircuitState::Open);
    let calls_before = state.calls.load(Ordering::SeqCst);

    let err = client
        .send_payment(&payment_request("2222405343248877"))
        .await
        .unwrap_err();

    // Rejected immediately without reaching the simulator.
    assert!(matches!(err, BankError::CircuitOpen));
    assert_eq!(state.calls.load(Ordering::SeqCst), calls_before);
}

#[tokio::test]
async fn success_closes_the_failure_streak() {
    let state = SimulatorState::default();
    let addr = simulator(state.clone()).await;
    let client = BankGatewayClient::new(&client_config(addr, 1, 2)).unwrap();

    // One failure, then a success, then another failure: never two in a row.
    let _ = client
        .send_payment(&payment_request("2222405343248870"))
        .await;
    client
        .send_payment(&payment_request("2222405343248877"))
        .await
        .unwrap();
    let _ = client
        .send_payment(&payment_request("2222405343248870"))
        .await;

    assert_eq!(client.circuit_state(), CircuitState::Closed);
}
