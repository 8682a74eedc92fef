use crate::api::AppState;
use crate::database::merchant_repository::Merchant;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;

/// `POST /api/merchant/create` — admin scope. Returns the new merchant with
/// its freshly issued API key.
pub async fn create_merchant(State(state): State<AppState>) -> Result<Json<Merchant>, AppError> {
    let merchant = state.merchants.create_merchant().await?;
    Ok(Json(merchant))
}
