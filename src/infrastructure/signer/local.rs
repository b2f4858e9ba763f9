//! Ed25519 development wallet that signs without user interaction.

use crate::infrastructure::signer::{SignatureScheme, SignedMessage, SignerError, WalletSigner};
use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use tracing::debug;

pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    pub fn generate() -> Self {
        LocalSigner {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Load a key from a 32-byte hex secret, with or without a `0x` prefix.
    pub fn from_secret_hex(secret: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(secret.trim().trim_start_matches("0x"))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SignerError::InvalidKey("secret must be 32 bytes".to_string()))?;
        Ok(LocalSigner {
            signing_key: SigningKey::from_bytes(&bytes),
        })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Account address derived from the public key.
    pub fn address(&self) -> String {
        format!("0x{}", hex::encode(self.verifying_key().to_bytes()))
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        self.verifying_key()
            .verify(message, &Signature::from_bytes(&bytes))
            .is_ok()
    }
}

#[async_trait]
impl WalletSigner for LocalSigner {
    async fn sign(&self, message: &[u8]) -> Result<SignedMessage, SignerError> {
        if message.is_empty() {
            return Err(SignerError::Rejected("refusing to sign an empty message".to_string()));
        }

        let signature = self.signing_key.sign(message).to_bytes().to_vec();
        let mut authenticator = self.verifying_key().to_bytes().to_vec();
        authenticator.extend_from_slice(&signature);
        debug!("Signed {} byte message for {}", message.len(), self.address());

        Ok(SignedMessage {
            scheme: SignatureScheme::Ed25519,
            signature,
            transaction_bytes: Some(message.to_vec()),
            authenticator_bytes: Some(authenticator),
        })
    }
}
