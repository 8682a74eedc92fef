//! HTTP surface: route handlers and shared application state.

pub mod merchants;
pub mod payments;

use crate::cache::PaymentViewCache;
use crate::services::merchants::MerchantService;
use crate::services::payments::PaymentService;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

use crate::middleware::auth;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub payments: Arc<PaymentService>,
    pub merchants: Arc<MerchantService>,
    pub payment_cache: Arc<PaymentViewCache>,
    pub admin_api_key: Option<String>,
}

/// Build the application router: merchant-scoped payment routes, the
/// admin-scoped merchant route, and an unauthenticated health probe.
pub fn router(state: AppState) -> Router {
    let merchant_routes = Router::new()
        .route("/api/payment/process", post(payments::process_payment))
        .route("/api/payment/{id}", get(payments::get_payment))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_merchant_key,
        ));

    let admin_routes = Router::new()
        .route("/api/merchant/create", post(merchants::create_merchant))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(merchant_routes)
        .merge(admin_routes)
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<&'static str, (axum::http::StatusCode, String)> {
    match crate::database::health_check(&state.db_pool).await {
        Ok(()) => Ok("OK"),
        Err(e) => Err((
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            e.to_string(),
        )),
    }
}
