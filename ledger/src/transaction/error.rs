//! Error types for building, signing and verifying transactions.

use thiserror::Error;

use crate::codec::EncodingError;
use crate::crypto::keys::KeyError;
use crate::keystore::KeyStoreError;

/// Errors raised by the transaction engine.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The group's cipher key is not valid hex or not a 32-byte AES key.
    #[error("invalid cipher key for group {group_id}: {reason}")]
    InvalidCipherKey { group_id: String, reason: String },

    /// A post in a private group was built without recipients.
    #[error("private group {group_id} requires recipient encryption keys")]
    MissingRecipients { group_id: String },

    /// The signing backend produced zero bytes.
    #[error("signing trx {trx_id} produced an empty signature")]
    EmptySignature { trx_id: String },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// No supported scheme could decode the sender key.
    #[error("sender key of trx {trx_id} is undecodable: {source}")]
    KeyDecode {
        trx_id: String,
        #[source]
        source: KeyError,
    },

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}
