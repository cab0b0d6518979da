//! # Cryptographic Primitives
//!
//! Everything security-related in the ledger flows through here:
//!
//! - **SHA-256** for consensus hashes (trx, content, bookkeeping).
//! - **secp256k1** ECDSA for current signatures, **libp2p** identity keys
//!   for legacy chains.
//! - **AES-256-GCM** for group payloads.
//! - **X25519** + BLAKE3 KDF for private-group recipient envelopes.
//!
//! Thin, type-safe wrappers around audited crates. Nothing here is clever.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod recipients;

pub use encryption::{decrypt, encrypt};
pub use hash::{sha256, Hash};
pub use keys::{KeyCodec, KeyCodecs, KeyError, KeyScheme, SigningKey};
pub use recipients::{seal_to, RecipientKey};
