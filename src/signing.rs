//! Signer abstraction for transaction submission
//!
//! This module provides an async signer interface so local signing,
//! hardware wallets, and remote signers can all sit behind the engine.
//! The shipped implementation is [`LocalSigner`], an ed25519 signer over
//! the canonical JSON encoding of an unsigned record.

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use sha2::{Digest, Sha256};

use crate::errors::{ExchangeError, ExchangeResult};
use crate::tx::UnsignedTx;

/// Async signer trait.
///
/// `sign` takes the record by shared reference and works on its own
/// serialized snapshot; the caller's record is never mutated, so one
/// template can back several signing attempts.
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Produce a signed transaction blob for `tx` using `secret`.
    async fn sign(&self, tx: &UnsignedTx, secret: &str) -> ExchangeResult<String>;
}

/// Local ed25519 signer.
///
/// The signing key is derived per call by hashing the wallet secret, so
/// the signer itself holds no key material.
#[derive(Debug, Default)]
pub struct LocalSigner;

impl LocalSigner {
    pub fn new() -> Self {
        Self
    }

    fn signing_key(secret: &str) -> ExchangeResult<SigningKey> {
        if secret.trim().is_empty() {
            return Err(ExchangeError::Signing(
                "empty wallet secret rejected".to_string(),
            ));
        }
        let seed: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Ok(SigningKey::from_bytes(&seed))
    }
}

#[async_trait]
impl TxSigner for LocalSigner {
    async fn sign(&self, tx: &UnsignedTx, secret: &str) -> ExchangeResult<String> {
        if tx.sequence.is_none() {
            return Err(ExchangeError::Signing(
                "cannot sign a record without a sequence number".to_string(),
            ));
        }

        let key = Self::signing_key(secret)?;

        let mut record = serde_json::to_value(tx)
            .map_err(|e| ExchangeError::Signing(format!("record serialization failed: {}", e)))?;
        let canonical = serde_json::to_vec(&record)
            .map_err(|e| ExchangeError::Signing(format!("record serialization failed: {}", e)))?;

        let signature = key.sign(&canonical);
        let object = record
            .as_object_mut()
            .ok_or_else(|| ExchangeError::Signing("record is not a JSON object".to_string()))?;
        object.insert(
            "SigningPubKey".to_string(),
            hex::encode_upper(key.verifying_key().to_bytes()).into(),
        );
        object.insert(
            "TxnSignature".to_string(),
            hex::encode_upper(signature.to_bytes()).into(),
        );

        let signed = serde_json::to_vec(&record)
            .map_err(|e| ExchangeError::Signing(format!("blob serialization failed: {}", e)))?;
        Ok(hex::encode(signed))
    }
}
