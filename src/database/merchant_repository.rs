use crate::database::error::DatabaseError;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Merchant account entity.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
pub struct Merchant {
    pub id: Uuid,
    pub api_key: String,
}

/// Repository for merchant accounts.
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a merchant, or replace the existing row with the same id.
    pub async fn upsert(&self, merchant: &Merchant) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO merchants (id, api_key) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET api_key = EXCLUDED.api_key",
        )
        .bind(merchant.id)
        .bind(&merchant.api_key)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }

    /// Exact, case-sensitive API key match. Blank input always misses
    /// without touching the database.
    pub async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>, DatabaseError> {
        if api_key.trim().is_empty() {
            return Ok(None);
        }

        sqlx::query_as::<_, Merchant>("SELECT id, api_key FROM merchants WHERE api_key = $1")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Merchant>, DatabaseError> {
        sqlx::query_as::<_, Merchant>("SELECT id, api_key FROM merchants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    pub async fn list(&self) -> Result<Vec<Merchant>, DatabaseError> {
        sqlx::query_as::<_, Merchant>("SELECT id, api_key FROM merchants ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    /// Delete a merchant. Deleting an absent id is a no-op, not an error.
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM merchants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }
}
