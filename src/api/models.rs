use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::core::errors::{BundleflowError, SettlementError};
use crate::core::models::Transfer;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub address: String,
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub creator: Option<MemberRequest>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub address: String,
    pub name: String,
    pub added_by: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    /// Encoded invite payload.
    pub invite: String,
    pub address: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct InviteQuery {
    pub inviter: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub group_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub group_id: String,
    pub invite: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddExpenseRequest {
    pub payer: String,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub involved_members: Option<Vec<String>>,
}

/// Pay everything `sender` owes in the group.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleGroupRequest {
    pub sender: String,
    /// Defaults to the configured settlement currency.
    pub currency: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct BalancesResponse {
    #[schema(value_type = Object)]
    pub balances: BTreeMap<String, f64>,
}

#[derive(Serialize, ToSchema)]
pub struct TransfersResponse {
    pub transfers: Vec<Transfer>,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for BundleflowError to implement IntoResponse
pub struct ApiError(pub BundleflowError);

impl From<BundleflowError> for ApiError {
    fn from(err: BundleflowError) -> Self {
        ApiError(err)
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        ApiError(BundleflowError::Settlement(err))
    }
}

fn settlement_status(err: &SettlementError) -> StatusCode {
    match err {
        SettlementError::InvalidRequest(_) | SettlementError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        SettlementError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
        SettlementError::AttemptInFlight(_) => StatusCode::CONFLICT,
        SettlementError::SignatureRejected(_) => StatusCode::FORBIDDEN,
        SettlementError::QuoteFailed(_) | SettlementError::PrepareFailed(_) | SettlementError::SubmitFailed(_) => {
            StatusCode::BAD_GATEWAY
        }
        SettlementError::PersistFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self.0 {
            BundleflowError::GroupNotFound(id) => (StatusCode::NOT_FOUND, format!("Group {} not found", id)),
            BundleflowError::NotGroupMember(address) => {
                (StatusCode::FORBIDDEN, format!("{} is not a group member", address))
            }
            BundleflowError::InvalidAddress(address) => {
                (StatusCode::BAD_REQUEST, format!("Invalid address: {}", address))
            }
            BundleflowError::InvalidInvite => (StatusCode::BAD_REQUEST, "Invalid invite".to_string()),
            BundleflowError::MalformedPayload(msg) => (StatusCode::BAD_REQUEST, format!("Malformed payload: {}", msg)),
            BundleflowError::InvalidAmount(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BundleflowError::InvalidSplitUser(address) => (
                StatusCode::BAD_REQUEST,
                format!("{} is not a group member for split", address),
            ),
            BundleflowError::InvalidInput(field, msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid input for {}: {}", field, msg.description),
            ),
            BundleflowError::Settlement(err) => (settlement_status(&err), err.to_string()),
            BundleflowError::StorageError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {}", msg)),
            BundleflowError::LoggingError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Logging error: {}", msg)),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
