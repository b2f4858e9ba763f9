pub mod local;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SignatureScheme {
    Ed25519,
    Other(String),
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::Ed25519 => write!(f, "Ed25519"),
            SignatureScheme::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Wallet output for a prepared message. The engine never inspects the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub scheme: SignatureScheme,
    pub signature: Vec<u8>,
    pub transaction_bytes: Option<Vec<u8>>,
    pub authenticator_bytes: Option<Vec<u8>>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("signing was rejected: {0}")]
    Rejected(String),
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

/// An opaque signing capability, typically an interactive wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign(&self, message: &[u8]) -> Result<SignedMessage, SignerError>;
}
