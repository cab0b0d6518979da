//! Building and signing transactions.
//!
//! [`TrxEngine`] turns a plaintext payload into a signed [`Trx`]: it stamps
//! identity and timing, seals the payload according to the group's
//! encryption policy, and asks the injected [`KeyStore`] for a signature
//! over the canonical signing hash.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::error::TransactionError;
use super::trx::Trx;
use super::types::TrxType;
use crate::config::{LedgerConfig, AES_KEY_LENGTH};
use crate::crypto::hash::Hash;
use crate::group::GroupDescriptor;
use crate::keystore::{KeyStore, SignerRef};

/// Current wall-clock time in Unix nanoseconds.
pub(crate) fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// Builds and signs transactions against an injected key store.
#[derive(Clone)]
pub struct TrxEngine {
    keystore: Arc<dyn KeyStore>,
    config: LedgerConfig,
}

impl TrxEngine {
    pub fn new(keystore: Arc<dyn KeyStore>, config: LedgerConfig) -> Self {
        Self { keystore, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Assemble an unsigned trx and return it with its signing hash.
    ///
    /// Posts in a private group are sealed to `recipients`; everything else
    /// is sealed under the group's shared cipher key.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::MissingRecipients`] for a private-group post
    ///   with no recipients.
    /// - [`TransactionError::InvalidCipherKey`] if the group key is not
    ///   32 bytes of hex.
    /// - [`TransactionError::KeyStore`] if encryption fails.
    pub fn build_unsigned(
        &self,
        group: &GroupDescriptor,
        trx_type: TrxType,
        nonce: u64,
        plaintext: &[u8],
        recipients: Option<&[String]>,
    ) -> Result<(Trx, Hash), TransactionError> {
        let data = if trx_type == TrxType::Post && group.is_private() {
            let recipients = match recipients {
                Some(r) if !r.is_empty() => r,
                _ => {
                    return Err(TransactionError::MissingRecipients {
                        group_id: group.group_id.clone(),
                    })
                }
            };
            self.keystore.encrypt_to(plaintext, recipients)?
        } else {
            let key = decode_cipher_key(group)?;
            self.keystore.encrypt_symmetric(plaintext, &key)?
        };

        let timestamp = now_nanos();
        let trx = Trx {
            trx_id: Uuid::new_v4().to_string(),
            trx_type,
            group_id: group.group_id.clone(),
            sender_pubkey: group.user_sign_pubkey.clone(),
            nonce,
            data,
            timestamp,
            version: self.config.version.clone(),
            expired: timestamp.saturating_add(self.config.trx_ttl_nanos()),
            sender_sign: Vec::new(),
        };
        let hash = trx.signing_hash()?;

        tracing::debug!(
            trx_id = %trx.trx_id,
            group_id = %trx.group_id,
            trx_type = %trx_type,
            nonce,
            "trx built"
        );
        Ok((trx, hash))
    }

    /// Attach a signature over `hash` from the key `signer` refers to.
    pub fn sign(
        &self,
        mut trx: Trx,
        hash: &Hash,
        signer: &SignerRef,
    ) -> Result<Trx, TransactionError> {
        let signature = self.keystore.sign(signer, hash)?;
        if signature.is_empty() {
            return Err(TransactionError::EmptySignature {
                trx_id: trx.trx_id,
            });
        }
        trx.sender_sign = signature;
        tracing::debug!(trx_id = %trx.trx_id, %signer, "trx signed");
        Ok(trx)
    }

    /// [`build_unsigned`](Self::build_unsigned) followed by [`sign`](Self::sign).
    pub fn create_trx(
        &self,
        group: &GroupDescriptor,
        trx_type: TrxType,
        nonce: u64,
        plaintext: &[u8],
        recipients: Option<&[String]>,
        signer: &SignerRef,
    ) -> Result<Trx, TransactionError> {
        let (trx, hash) = self.build_unsigned(group, trx_type, nonce, plaintext, recipients)?;
        self.sign(trx, &hash, signer)
    }
}

impl std::fmt::Debug for TrxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrxEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn decode_cipher_key(group: &GroupDescriptor) -> Result<Vec<u8>, TransactionError> {
    let key = hex::decode(&group.cipher_key).map_err(|e| TransactionError::InvalidCipherKey {
        group_id: group.group_id.clone(),
        reason: e.to_string(),
    })?;
    if key.len() != AES_KEY_LENGTH {
        return Err(TransactionError::InvalidCipherKey {
            group_id: group.group_id.clone(),
            reason: format!("expected {AES_KEY_LENGTH} bytes, got {}", key.len()),
        });
    }
    Ok(key)
}
