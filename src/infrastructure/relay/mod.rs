//! Gasless payment relay seam.
//!
//! The relay fronts network fees for a batch payment and recovers them through a
//! relayer fee quoted up front. Every call is a remote round-trip with its own
//! latency and failure modes; timeouts surface as ordinary [`RelayError`]s.

pub mod mock;

use crate::core::amount::BaseUnits;
use crate::core::settlement::payload::BatchPayload;
use crate::infrastructure::signer::SignedMessage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Failure reported by the relay, with its wire error code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct RelayError {
    pub code: String,
    pub message: String,
}

impl RelayError {
    pub const INSUFFICIENT_BALANCE: &'static str = "INSUFFICIENT_BALANCE";
    pub const SIGNATURE_REJECTED: &'static str = "SIGNATURE_REJECTED";
    pub const UNAVAILABLE: &'static str = "RELAY_UNAVAILABLE";
    pub const TIMEOUT: &'static str = "TIMEOUT";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        RelayError {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QuoteRequest {
    pub sender: String,
    pub recipient_contract: String,
    pub currency: String,
    pub amount: BaseUnits,
    pub chain_id: String,
}

/// Relay-specific quote state. Only relay implementations look inside it;
/// the settlement engine forwards it untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteToken(serde_json::Value);

impl QuoteToken {
    pub fn new(raw: serde_json::Value) -> Self {
        QuoteToken(raw)
    }

    pub fn as_raw(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A relay-issued fee commitment for one batch, valid until `expires_at`.
#[derive(Clone, Debug)]
pub struct Quote {
    amount: BaseUnits,
    relayer_fee: BaseUnits,
    chain_id: String,
    expires_at: DateTime<Utc>,
    token: QuoteToken,
}

impl Quote {
    pub fn new(
        amount: BaseUnits,
        relayer_fee: BaseUnits,
        chain_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        token: QuoteToken,
    ) -> Self {
        Quote {
            amount,
            relayer_fee,
            chain_id: chain_id.into(),
            expires_at,
            token,
        }
    }

    pub fn amount(&self) -> BaseUnits {
        self.amount
    }

    pub fn relayer_fee(&self) -> BaseUnits {
        self.relayer_fee
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn token(&self) -> &QuoteToken {
        &self.token
    }
}

/// Message the relay bound to a quote, ready for the wallet to sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedMessage {
    pub message: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct SignedTransfer {
    pub signed: SignedMessage,
    pub function_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub tx_hash: String,
}

#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, RelayError>;

    /// Sender's on-chain balance in base units.
    async fn get_balance(&self, chain_id: &str, address: &str, currency: &str) -> Result<BaseUnits, RelayError>;

    async fn prepare_transfer(&self, payload: &BatchPayload, quote: &Quote) -> Result<PreparedMessage, RelayError>;

    async fn execute_transfer(&self, signed: &SignedTransfer, chain_id: &str) -> Result<ExecutionReceipt, RelayError>;
}
