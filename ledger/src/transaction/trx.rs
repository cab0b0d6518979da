//! The transaction record and its canonical signing preimage.

use serde::{Deserialize, Serialize};

use super::types::TrxType;
use crate::codec::{self, EncodingError};
use crate::crypto::hash::{sha256, Hash};

// ---------------------------------------------------------------------------
// Trx
// ---------------------------------------------------------------------------

/// A group transaction.
///
/// `trx_id` is a random UUID assigned once at creation; it is never derived
/// from content and never recomputed. A retry is a new trx with a new id and
/// a new nonce, not a re-signed copy.
///
/// # Canonical Byte Format
///
/// [`Trx::to_bytes`] encodes every field in declaration order. The signing
/// hash is taken over the same encoding with `sender_sign` left out (see
/// [`Trx::signing_hash`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trx {
    pub trx_id: String,
    pub trx_type: TrxType,
    pub group_id: String,
    /// Encoded public key of the signer (secp256k1 or legacy libp2p).
    pub sender_pubkey: String,
    /// Per-(group, signer) sequence number; 0 for out-of-stream trxs.
    pub nonce: u64,
    /// Encrypted payload.
    pub data: Vec<u8>,
    /// Creation time, Unix nanoseconds.
    pub timestamp: i64,
    pub version: String,
    /// Advisory expiry, Unix nanoseconds.
    pub expired: i64,
    /// Signature over [`Trx::signing_hash`]. Empty until signed.
    pub sender_sign: Vec<u8>,
}

/// Borrowed view of every signed field of a [`Trx`].
#[derive(Serialize)]
struct SigningPreimage<'a> {
    trx_id: &'a str,
    trx_type: TrxType,
    group_id: &'a str,
    sender_pubkey: &'a str,
    nonce: u64,
    data: &'a [u8],
    timestamp: i64,
    version: &'a str,
    expired: i64,
}

impl Trx {
    fn signing_preimage(&self) -> SigningPreimage<'_> {
        SigningPreimage {
            trx_id: &self.trx_id,
            trx_type: self.trx_type,
            group_id: &self.group_id,
            sender_pubkey: &self.sender_pubkey,
            nonce: self.nonce,
            data: &self.data,
            timestamp: self.timestamp,
            version: &self.version,
            expired: self.expired,
        }
    }

    /// Canonical bytes of the signed fields (everything but `sender_sign`).
    pub fn signable_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        codec::encode(&self.signing_preimage())
    }

    /// SHA-256 of [`Trx::signable_bytes`]. This is what the sender signs.
    pub fn signing_hash(&self) -> Result<Hash, EncodingError> {
        Ok(sha256(&self.signable_bytes()?))
    }

    /// Wire/storage encoding of the full record.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        codec::decode(bytes)
    }

    pub fn is_signed(&self) -> bool {
        !self.sender_sign.is_empty()
    }

    /// Whether the advisory expiry has passed at `now_nanos`.
    pub fn is_expired(&self, now_nanos: i64) -> bool {
        now_nanos > self.expired
    }
}
