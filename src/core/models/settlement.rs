use super::transfer::Transfer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Confirmed,
    Failed,
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Confirmed => "confirmed",
            SettlementStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One executed batch payment covering one or more transfers.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementBatch {
    pub id: String,
    pub group_id: String,
    pub transfers: Vec<Transfer>,
    pub currency: String,
    pub tx_hash: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub timestamp: DateTime<Utc>,
    pub status: SettlementStatus,
}

impl SettlementBatch {
    pub fn is_confirmed(&self) -> bool {
        self.status == SettlementStatus::Confirmed
    }
}
