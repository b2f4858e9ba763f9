use crate::core::models::SettlementBatch;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// One payment leg of a batch: pay `amount` of `currency` to `recipient`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TransferRequest {
    pub recipient: String,
    /// Human-readable decimal amount. Accepts a JSON string or number.
    #[serde(deserialize_with = "decimal_text")]
    #[schema(value_type = String, example = "12.5")]
    pub amount: String,
    pub currency: String,
}

impl TransferRequest {
    pub fn new(recipient: impl Into<String>, amount: impl fmt::Display, currency: impl Into<String>) -> Self {
        TransferRequest {
            recipient: recipient.into(),
            amount: amount.to_string(),
            currency: currency.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SettlementRequest {
    pub sender: String,
    pub transfers: Vec<TransferRequest>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOutcome {
    pub attempt_id: String,
    pub tx_hash: String,
    /// Relayer fee charged, as a human-readable decimal.
    pub relayer_fee: String,
    pub batch: SettlementBatch,
}

fn decimal_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawAmount::deserialize(deserializer)? {
        RawAmount::Text(text) => text,
        // f64 Display never switches to exponent notation, unlike serde_json's.
        RawAmount::Number(number) => match (number.as_u64(), number.as_f64()) {
            (Some(integer), _) => integer.to_string(),
            (None, Some(float)) => float.to_string(),
            (None, None) => number.to_string(),
        },
    })
}
