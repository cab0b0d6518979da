//! # Hashing Utilities
//!
//! Two hash functions, two jobs:
//!
//! - **SHA-256** — the consensus hash. Trx signing hashes, block content
//!   hashes and bookkeeping hashes are all SHA-256 of canonical bytes, so
//!   any node (or any other implementation) can recompute them.
//!
//! - **BLAKE3** — local key derivation only. Its `derive_key` mode turns an
//!   X25519 shared secret into an AES key for recipient envelopes. Nothing
//!   hashed with BLAKE3 ever lands in a block.

use sha2::{Digest, Sha256};

use crate::config::HASH_OUTPUT_LENGTH;

/// A 32-byte consensus digest.
pub type Hash = [u8; HASH_OUTPUT_LENGTH];

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use quorum_ledger::crypto::hash::sha256;
///
/// let hash = sha256(b"quorum");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive a 32-byte key from input keying material with a context string.
///
/// BLAKE3's `derive_key` mode uses a context-specific IV, so keys derived
/// under different contexts never collide.
pub fn derive_key(context: &str, material: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in material {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Hex rendering of a digest, for logs and the CLI.
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc"), FIPS 180-2 appendix B.1.
        assert_eq!(
            to_hex(&sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn derive_key_is_context_separated() {
        let a = derive_key("ctx-a", &[b"secret".as_slice()]);
        let b = derive_key("ctx-b", &[b"secret".as_slice()]);
        assert_ne!(a, b);
        assert_eq!(a, derive_key("ctx-a", &[b"secret".as_slice()]));
    }

    #[test]
    fn derive_key_parts_are_streamed() {
        assert_eq!(
            derive_key("ctx", &[b"ab".as_slice(), b"cd".as_slice()]),
            derive_key("ctx", &[b"abcd".as_slice()])
        );
    }
}
