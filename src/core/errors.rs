use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Amount is negative: {0}")]
    Negative(String),
    #[error("Amount exceeds the representable range: {0}")]
    Overflow(String),
}

/// Terminal outcome of a failed settlement attempt.
///
/// Relay and signer failures are folded into these variants at the orchestrator
/// boundary; raw relay codes are never exposed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SettlementError {
    #[error("Quote failed: {0}")]
    QuoteFailed(String),
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },
    #[error("Signature rejected: {0}")]
    SignatureRejected(String),
    #[error("Prepare failed: {0}")]
    PrepareFailed(String),
    #[error("Submit failed: {0}")]
    SubmitFailed(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Invalid settlement request: {0}")]
    InvalidRequest(String),
    #[error("A settlement attempt is already in flight for group {0}")]
    AttemptInFlight(String),
    #[error("Settlement {tx_hash} confirmed on-chain but could not be recorded: {reason}")]
    PersistFailed { tx_hash: String, reason: String },
}

impl SettlementError {
    /// Whether the caller may start a fresh attempt from `Idle`.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SettlementError::QuoteFailed(_)
                | SettlementError::SignatureRejected(_)
                | SettlementError::PrepareFailed(_)
                | SettlementError::SubmitFailed(_)
                | SettlementError::AttemptInFlight(_)
        )
    }
}

#[derive(Error, Debug, Serialize)]
pub enum BundleflowError {
    #[error("Group {0} not found")]
    GroupNotFound(String),
    #[error("Member {0} is not part of the group")]
    NotGroupMember(String),
    #[error("Invalid member address: {0}")]
    InvalidAddress(String),
    #[error("Invalid invite")]
    InvalidInvite,
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("Invalid split member: {0}")]
    InvalidSplitUser(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
}
