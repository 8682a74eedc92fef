use crate::database::error::{DatabaseError, DatabaseErrorKind};
use crate::encryption::EncryptionCodec;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// Terminal outcome of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The bank approved the charge; an authorization code is attached.
    Authorized,
    /// The bank explicitly refused the charge.
    Declined,
    /// The request failed validation locally and never reached the bank.
    Rejected,
}

impl PaymentStatus {
    pub fn to_db_status(self) -> &'static str {
        match self {
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Declined => "declined",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn from_db_status(status: &str) -> Option<Self> {
        match status {
            "authorized" => Some(PaymentStatus::Authorized),
            "declined" => Some(PaymentStatus::Declined),
            "rejected" => Some(PaymentStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_status())
    }
}

/// Payment entity as seen by callers of the store: card number and CVV are
/// plaintext here and ciphertext only in the underlying rows.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub card_number: String,
    pub cvv: String,
    pub amount: i64,
    pub currency: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub status: PaymentStatus,
    pub authorization_code: Option<String>,
}

/// Raw row shape; protected columns hold ciphertext.
#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    merchant_id: Uuid,
    name: String,
    card_number: String,
    cvv: String,
    amount: i64,
    currency: String,
    expiry_month: i32,
    expiry_year: i32,
    status: String,
    authorization_code: Option<String>,
}

const PAYMENT_COLUMNS: &str = "id, merchant_id, name, card_number, cvv, amount, currency, \
     expiry_month, expiry_year, status, authorization_code";

/// Repository for payment records with transparent field-level encryption.
pub struct PaymentRepository {
    pool: PgPool,
    codec: Arc<EncryptionCodec>,
}

impl PaymentRepository {
    pub fn new(pool: PgPool, codec: Arc<EncryptionCodec>) -> Self {
        Self { pool, codec }
    }

    /// Insert a payment, or fully replace an existing row with the same id.
    ///
    /// The concurrent-insert race for a new id resolves at the storage layer:
    /// the primary key turns the loser's insert into the conflict arm.
    pub async fn upsert(&self, payment: &Payment) -> Result<(), DatabaseError> {
        let card_number = self.codec.encrypt_required(&payment.card_number)?;
        let cvv = self.codec.encrypt_required(&payment.cvv)?;

        sqlx::query(
            "INSERT INTO payments \
             (id, merchant_id, name, card_number, cvv, amount, currency, \
              expiry_month, expiry_year, status, authorization_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE \
             SET merchant_id = EXCLUDED.merchant_id, \
                 name = EXCLUDED.name, \
                 card_number = EXCLUDED.card_number, \
                 cvv = EXCLUDED.cvv, \
                 amount = EXCLUDED.amount, \
                 currency = EXCLUDED.currency, \
                 expiry_month = EXCLUDED.expiry_month, \
                 expiry_year = EXCLUDED.expiry_year, \
                 status = EXCLUDED.status, \
                 authorization_code = EXCLUDED.authorization_code",
        )
        .bind(payment.id)
        .bind(payment.merchant_id)
        .bind(&payment.name)
        .bind(card_number)
        .bind(cvv)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.expiry_month)
        .bind(payment.expiry_year)
        .bind(payment.status.to_db_status())
        .bind(&payment.authorization_code)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }

    /// Look up one payment, scoped to its owning merchant.
    pub async fn find_by_id(
        &self,
        id: Uuid,
        merchant_id: Uuid,
    ) -> Result<Option<Payment>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = $1 AND merchant_id = $2",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        row.map(|row| self.decode(row)).transpose()
    }

    /// One page of a merchant's payments. Pages are 1-based; ordering is by
    /// id so repeated reads see a stable sequence.
    pub async fn list_by_merchant(
        &self,
        merchant_id: Uuid,
        page_size: i64,
        page: i64,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let page = page.max(1);
        let page_size = page_size.max(0);

        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE merchant_id = $1 \
             ORDER BY id OFFSET $2 LIMIT $3",
            PAYMENT_COLUMNS
        ))
        .bind(merchant_id)
        .bind((page - 1) * page_size)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter().map(|row| self.decode(row)).collect()
    }

    fn decode(&self, row: PaymentRow) -> Result<Payment, DatabaseError> {
        let status = PaymentStatus::from_db_status(&row.status).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::Corrupt {
                message: format!("unknown payment status '{}'", row.status),
            })
        })?;

        Ok(Payment {
            id: row.id,
            merchant_id: row.merchant_id,
            name: row.name,
            card_number: self.codec.decrypt_required(&row.card_number)?,
            cvv: self.codec.decrypt_required(&row.cvv)?,
            amount: row.amount,
            currency: row.currency,
            expiry_month: row.expiry_month,
            expiry_year: row.expiry_year,
            status,
            authorization_code: row.authorization_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_db_strings() {
        for status in [
            PaymentStatus::Authorized,
            PaymentStatus::Declined,
            PaymentStatus::Rejected,
        ] {
            assert_eq!(
                PaymentStatus::from_db_status(status.to_db_status()),
                Some(status)
            );
        }
        assert_eq!(PaymentStatus::from_db_status("pending"), None);
    }

    #[test]
    fn status_serializes_as_snake_case_string() {
        let json = serde_json::to_string(&PaymentStatus::Authorized).unwrap();
        assert_eq!(json, "\"authorized\"");
    }
}
