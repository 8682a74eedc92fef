//! Merchant account service

use crate::database::merchant_repository::{Merchant, MerchantRepository};
use crate::error::AppResult;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct MerchantService {
    repository: Arc<MerchantRepository>,
}

impl MerchantService {
    pub fn new(repository: Arc<MerchantRepository>) -> Self {
        Self { repository }
    }

    /// Create a merchant with a fresh id and API key.
    pub async fn create_merchant(&self) -> AppResult<Merchant> {
        let merchant = Merchant {
            id: Uuid::new_v4(),
            api_key: generate_api_key(),
        };

        self.repository.upsert(&merchant).await?;
        info!(merchant_id = %merchant.id, "merchant created");
        Ok(merchant)
    }

    /// Resolve an API key to its merchant, if any.
    pub async fn find_by_api_key(&self, api_key: &str) -> AppResult<Option<Merchant>> {
        Ok(self.repository.find_by_api_key(api_key).await?)
    }
}

/// Opaque credential string: SHA-256 over fresh random material, hex-encoded
/// for a stable 64-character key.
fn generate_api_key() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}
