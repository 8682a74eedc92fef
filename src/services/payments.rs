//! Payment processing service
//!
//! Ties validation, the bank call and persistence together. Every attempt
//! ends in a terminal state: Rejected records are written without a bank
//! call, Authorized/Declined records are written after one, and a failed
//! bank call propagates to the caller without persisting anything.

use crate::bank::{BankClient, BankPaymentRequest};
use crate::database::payment_repository::{Payment, PaymentRepository, PaymentStatus};
use crate::error::AppResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Inbound payment request as submitted by a merchant. Transient: validated,
/// processed, discarded. The owning merchant is not part of the body; it is
/// supplied by the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentProcessRequest {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_month: Option<i32>,
    #[serde(default)]
    pub expiry_year: i32,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub name: String,
}

/// Externally visible projection of a payment. Only the last four digits of
/// the card number ever leave the service; the CVV never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub card_number_last_four: String,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub currency: String,
    pub amount: i64,
}

pub struct PaymentService {
    repository: Arc<PaymentRepository>,
    bank: Arc<dyn BankClient>,
}

impl PaymentService {
    pub fn new(repository: Arc<PaymentRepository>, bank: Arc<dyn BankClient>) -> Self {
        Self { repository, bank }
    }

    /// Send a validated request to the bank and record the outcome under a
    /// freshly generated id. A failed bank call propagates without writing
    /// a record.
    pub async fn process_payment(
        &self,
        merchant_id: Uuid,
        request: &PaymentProcessRequest,
    ) -> AppResult<PaymentView> {
        let bank_response = self
            .bank
            .send_payment(&BankPaymentRequest {
                card_number: request.card_number.clone(),
                expiry_date: format!(
                    "{}/{}",
                    request.expiry_month.unwrap_or(1),
                    request.expiry_year
                ),
                cvv: request.cvv.clone(),
                amount: request.amount,
                currency: request.currency.clone(),
            })
            .await?;

        let transaction_id = Uuid::new_v4();
        let status = if bank_response.authorized {
            PaymentStatus::Authorized
        } else {
            PaymentStatus::Declined
        };
        // Invariant: an authorization code is attached iff the bank authorized.
        let authorization_code = if bank_response.authorized {
            bank_response.authorization_code
        } else {
            None
        };

        self.repository
            .upsert(&self.to_payment(transaction_id, merchant_id, request, status, authorization_code))
            .await?;

        info!(payment_id = %transaction_id, status = %status, "payment processed");
        Ok(Self::to_view(transaction_id, status, request))
    }

    /// Record a request that already failed validation. No bank call is
    /// made; the write itself is the only thing that can fail.
    pub async fn reject_payment(
        &self,
        merchant_id: Uuid,
        request: &PaymentProcessRequest,
    ) -> AppResult<PaymentView> {
        let transaction_id = Uuid::new_v4();

        self.repository
            .upsert(&self.to_payment(
                transaction_id,
                merchant_id,
                request,
                PaymentStatus::Rejected,
                None,
            ))
            .await?;

        info!(payment_id = %transaction_id, "payment rejected");
        Ok(Self::to_view(transaction_id, PaymentStatus::Rejected, request))
    }

    /// Fetch a previously recorded payment. Absence is a successful empty
    /// result, not an error. The lookup is scoped to the calling merchant.
    pub async fn get_payment(
        &self,
        id: Uuid,
        merchant_id: Uuid,
    ) -> AppResult<Option<PaymentView>> {
        let payment = self.repository.find_by_id(id, merchant_id).await?;
        Ok(payment.as_ref().map(view_of_payment))
    }

    /// One page of a merchant's recorded payments, 1-based.
    pub async fn list_payments(
        &self,
        merchant_id: Uuid,
        page_size: i64,
        page: i64,
    ) -> AppResult<Vec<PaymentView>> {
        let payments = self
            .repository
            .list_by_merchant(merchant_id, page_size, page)
            .await?;
        Ok(payments.iter().map(view_of_payment).collect())
    }

    fn to_payment(
        &self,
        id: Uuid,
        merchant_id: Uuid,
        request: &PaymentProcessRequest,
        status: PaymentStatus,
        authorization_code: Option<String>,
    ) -> Payment {
        Payment {
            id,
            merchant_id,
            name: request.name.clone(),
            card_number: request.card_number.clone(),
            cvv: request.cvv.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            expiry_month: request.expiry_month.unwrap_or(1),
            expiry_year: request.expiry_year,
            status,
            authorization_code,
        }
    }

    fn to_view(id: Uuid, status: PaymentStatus, request: &PaymentProcessRequest) -> PaymentView {
        PaymentView {
            id,
            status,
            card_number_last_four: last_four(&request.card_number),
            expiry_month: request.expiry_month.unwrap_or(1),
            expiry_year: request.expiry_year,
            currency: request.currency.clone(),
            amount: request.amount,
        }
    }
}

fn view_of_payment(payment: &Payment) -> PaymentView {
    PaymentView {
        id: payment.id,
        status: payment.status,
        card_number_last_four: last_four(&payment.card_number),
        expiry_month: payment.expiry_month,
        expiry_year: payment.expiry_year,
        currency: payment.currency.clone(),
        amount: payment.amount,
    }
}

/// Final four characters of the plaintext card number. Always derived
/// before encryption, at the moment a view is constructed.
fn last_four(card_number: &str) -> String {
    let chars: Vec<char> = card_number.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}
