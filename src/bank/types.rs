use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// Wire request for `POST {base}/payments`.
#[derive(Debug, Clone, Serialize)]
pub struct BankPaymentRequest {
    pub card_number: String,
    /// `"{month}/{year}"`, month without zero padding.
    pub expiry_date: String,
    pub cvv: String,
    pub amount: i64,
    pub currency: String,
}

/// Wire response from the bank.
#[derive(Debug, Clone, Deserialize)]
pub struct BankPaymentResponse {
    pub authorized: bool,
    /// A null or blank token decodes to `None`, never a sentinel value.
    #[serde(default, deserialize_with = "blank_token_as_none")]
    pub authorization_code: Option<String>,
}

fn blank_token_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|token| !token.trim().is_empty()))
}
