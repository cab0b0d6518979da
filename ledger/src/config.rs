//! # Protocol Configuration & Constants
//!
//! Every magic number the ledger core depends on lives here. Changing the
//! encoding- or hash-related values after a group has produced blocks makes
//! every existing block unverifiable, so treat them as frozen.
//!
//! Runtime knobs that a deployment may legitimately tune (transaction TTL,
//! post size limit, version tag) are carried by [`LedgerConfig`] instead of
//! being read from these constants directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Version tag stamped into every transaction built by this crate.
pub const PROTOCOL_VERSION: &str = "2.0.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// SHA-256 everywhere: trx hashes, content hashes, bookkeeping hashes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// AES-256-GCM key length in bytes. Group cipher keys decode to this size.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. Twelve. Not sixteen.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// X25519 public key length for private-group recipients.
pub const X25519_KEY_LENGTH: usize = 32;

/// Compact secp256k1 ECDSA signature plus one recovery byte.
pub const SECP256K1_SIGNATURE_LENGTH: usize = 65;

/// Context string for deriving per-recipient wrapping keys from X25519
/// shared secrets. Changing it breaks decryption of every sealed post.
pub const RECIPIENT_KDF_CONTEXT: &str = "quorum-ledger 2024 recipient wrap key v1";

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Default lifetime of a transaction. `expired = timestamp + TRX_TTL`.
/// Advisory only; the pool upstream evicts on it, verification ignores it.
pub const TRX_TTL: Duration = Duration::from_secs(30);

/// Maximum encoded size of a content post payload (200 KiB).
pub const OBJECT_SIZE_LIMIT: usize = 200 * 1024;

/// Nonce carried by block request/response and block-produced notices.
/// Those trxs sit outside the sender's ordered nonce stream.
pub const OUT_OF_STREAM_NONCE: u64 = 0;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Runtime configuration for the transaction engine and factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// How long a freshly built transaction stays valid for the pool.
    #[serde(with = "duration_secs")]
    pub trx_ttl: Duration,
    /// Upper bound on the encoded size of a post payload.
    pub max_post_payload: usize,
    /// Version tag written into `Trx::version`.
    pub version: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            trx_ttl: TRX_TTL,
            max_post_payload: OBJECT_SIZE_LIMIT,
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Overrides the transaction TTL.
    pub fn with_trx_ttl(mut self, ttl: Duration) -> Self {
        self.trx_ttl = ttl;
        self
    }

    /// Overrides the post payload limit.
    pub fn with_max_post_payload(mut self, limit: usize) -> Self {
        self.max_post_payload = limit;
        self
    }

    /// TTL expressed in nanoseconds, saturating at `i64::MAX`.
    pub fn trx_ttl_nanos(&self) -> i64 {
        i64::try_from(self.trx_ttl.as_nanos()).unwrap_or(i64::MAX)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
