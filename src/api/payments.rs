use crate::api::AppState;
use crate::cache::{self, PaymentKey};
use crate::error::AppError;
use crate::middleware::auth::AuthedMerchant;
use crate::services::payments::{PaymentProcessRequest, PaymentView};
use crate::services::validation;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use tracing::warn;
use uuid::Uuid;

/// `POST /api/payment/process` — merchant scope.
///
/// A request that fails validation is recorded as Rejected and returned in
/// the normal success envelope; only a failed bank call is an error.
pub async fn process_payment(
    State(state): State<AppState>,
    Extension(AuthedMerchant(merchant)): Extension<AuthedMerchant>,
    Json(request): Json<PaymentProcessRequest>,
) -> Result<Json<PaymentView>, AppError> {
    let failures = validation::validate(&request);
    if !failures.is_empty() {
        warn!(
            merchant_id = %merchant.id,
            violations = failures.len(),
            "payment request failed validation"
        );
        let view = state.payments.reject_payment(merchant.id, &request).await?;
        return Ok(Json(view));
    }

    let view = state.payments.process_payment(merchant.id, &request).await?;
    Ok(Json(view))
}

/// `GET /api/payment/{id}` — merchant scope, read-through cached.
/// An unknown id yields `null`, not an error.
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(AuthedMerchant(merchant)): Extension<AuthedMerchant>,
    Path(id): Path<String>,
) -> Result<Json<Option<PaymentView>>, AppError> {
    let id: Uuid = id
        .parse()
        .map_err(|_| AppError::invalid_request("payment id must be a UUID"))?;

    let payments = state.payments.clone();
    let merchant_id = merchant.id;
    let result = cache::read_through(
        &state.payment_cache,
        PaymentKey::new(merchant_id, id),
        move || async move { payments.get_payment(id, merchant_id).await },
    )
    .await?;

    Ok(Json(result))
}
