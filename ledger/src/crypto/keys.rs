//! # Key Schemes
//!
//! A group's chain may carry signatures under two public-key schemes:
//!
//! - **secp256k1** — the primary scheme. Public keys travel as URL-safe,
//!   unpadded base64 of a SEC1 point (33-byte compressed or 65-byte
//!   uncompressed). Signatures are 64-byte compact ECDSA followed by a
//!   recovery byte, computed directly over a 32-byte digest.
//!
//! - **libp2p** — the legacy network-identity scheme that older chains
//!   were produced under. Public keys travel as standard base64 of the
//!   libp2p protobuf public-key encoding. Kept for verification so old
//!   blocks stay valid.
//!
//! Verification never special-cases either type. Each scheme is a
//! [`KeyCodec`]; [`KeyCodecs`] walks an ordered list and the first codec
//! that *decodes* the key decides the verdict. Only when no codec decodes
//! it do we report an error.
//!
//! Key bytes are never logged. Public keys may be.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use once_cell::sync::Lazy;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{HASH_OUTPUT_LENGTH, SECP256K1_SIGNATURE_LENGTH};

static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    /// None of the supported schemes could decode the public key.
    #[error("public key could not be decoded by any supported scheme")]
    Undecodable,

    #[error("invalid secret key bytes for {0}")]
    InvalidSecretKey(KeyScheme),

    #[error("{0} signing failed: {1}")]
    SigningFailed(KeyScheme, String),

    #[error("secp256k1 signs 32-byte digests only, got {0} bytes")]
    InvalidDigestLength(usize),
}

/// The public-key schemes this ledger understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    Secp256k1,
    Libp2p,
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secp256k1 => write!(f, "secp256k1"),
            Self::Libp2p => write!(f, "libp2p"),
        }
    }
}

impl std::str::FromStr for KeyScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secp256k1" | "eth" => Ok(Self::Secp256k1),
            "libp2p" => Ok(Self::Libp2p),
            other => Err(format!("unknown key scheme: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Signing keys
// ---------------------------------------------------------------------------

/// A private signing key under one of the supported schemes.
pub enum SigningKey {
    Secp256k1(SecretKey),
    Libp2p(libp2p::identity::Keypair),
}

impl SigningKey {
    /// Generate a fresh key under `scheme` from the OS RNG.
    pub fn generate(scheme: KeyScheme) -> Self {
        match scheme {
            KeyScheme::Secp256k1 => {
                let (secret, _) = SECP256K1_CONTEXT.generate_keypair(&mut rand::rngs::OsRng);
                Self::Secp256k1(secret)
            }
            KeyScheme::Libp2p => Self::Libp2p(libp2p::identity::Keypair::generate_ed25519()),
        }
    }

    /// Restore a key from the bytes produced by [`SigningKey::to_secret_bytes`].
    pub fn from_secret_bytes(scheme: KeyScheme, bytes: &[u8]) -> Result<Self, KeyError> {
        match scheme {
            KeyScheme::Secp256k1 => SecretKey::from_slice(bytes)
                .map(Self::Secp256k1)
                .map_err(|_| KeyError::InvalidSecretKey(scheme)),
            KeyScheme::Libp2p => libp2p::identity::Keypair::from_protobuf_encoding(bytes)
                .map(Self::Libp2p)
                .map_err(|_| KeyError::InvalidSecretKey(scheme)),
        }
    }

    /// Raw secret for export. Handle with care.
    pub fn to_secret_bytes(&self) -> Result<Vec<u8>, KeyError> {
        match self {
            Self::Secp256k1(secret) => Ok(secret.secret_bytes().to_vec()),
            Self::Libp2p(keypair) => keypair
                .to_protobuf_encoding()
                .map_err(|e| KeyError::SigningFailed(KeyScheme::Libp2p, e.to_string())),
        }
    }

    pub fn scheme(&self) -> KeyScheme {
        match self {
            Self::Secp256k1(_) => KeyScheme::Secp256k1,
            Self::Libp2p(_) => KeyScheme::Libp2p,
        }
    }

    /// The public key in its on-chain string encoding.
    pub fn public_key_encoded(&self) -> String {
        match self {
            Self::Secp256k1(secret) => {
                let public = PublicKey::from_secret_key(&SECP256K1_CONTEXT, secret);
                URL_SAFE_NO_PAD.encode(public.serialize())
            }
            Self::Libp2p(keypair) => STANDARD.encode(keypair.public().encode_protobuf()),
        }
    }

    /// Sign a 32-byte digest.
    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Self::Secp256k1(secret) => {
                let digest: [u8; HASH_OUTPUT_LENGTH] = digest
                    .try_into()
                    .map_err(|_| KeyError::InvalidDigestLength(digest.len()))?;
                let message = Message::from_digest(digest);
                let signature: RecoverableSignature =
                    SECP256K1_CONTEXT.sign_ecdsa_recoverable(&message, secret);
                let (recovery_id, compact) = signature.serialize_compact();

                let mut out = Vec::with_capacity(SECP256K1_SIGNATURE_LENGTH);
                out.extend_from_slice(&compact);
                out.push(recovery_id.to_i32() as u8);
                Ok(out)
            }
            Self::Libp2p(keypair) => keypair
                .sign(digest)
                .map_err(|e| KeyError::SigningFailed(KeyScheme::Libp2p, e.to_string())),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({}, pub={})", self.scheme(), self.public_key_encoded())
    }
}

// ---------------------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------------------

/// One public-key scheme's decode + verify strategy.
pub trait KeyCodec: Send + Sync {
    fn scheme(&self) -> KeyScheme;

    /// `None` if `encoded` is not a key of this scheme. Otherwise the
    /// verification verdict for `signature` over `message`.
    fn verify(&self, encoded: &str, message: &[u8], signature: &[u8]) -> Option<bool>;
}

/// secp256k1 keys in URL-safe unpadded base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Codec;

impl KeyCodec for Secp256k1Codec {
    fn scheme(&self) -> KeyScheme {
        KeyScheme::Secp256k1
    }

    fn verify(&self, encoded: &str, message: &[u8], signature: &[u8]) -> Option<bool> {
        let raw = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let public = PublicKey::from_slice(&raw).ok()?;

        // A decoded key means this codec owns the verdict from here on.
        let Ok(digest) = <[u8; HASH_OUTPUT_LENGTH]>::try_from(message) else {
            return Some(false);
        };
        // Exactly compact || recovery id, and the id must recover the key.
        if signature.len() != SECP256K1_SIGNATURE_LENGTH {
            return Some(false);
        }
        let (compact, recovery) = signature.split_at(SECP256K1_SIGNATURE_LENGTH - 1);
        let Ok(recovery_id) = RecoveryId::from_i32(i32::from(recovery[0])) else {
            return Some(false);
        };
        let Ok(sig) = RecoverableSignature::from_compact(compact, recovery_id) else {
            return Some(false);
        };
        let message = Message::from_digest(digest);
        let recovered = SECP256K1_CONTEXT.recover_ecdsa(&message, &sig);
        if recovered.ok() != Some(public) {
            return Some(false);
        }
        Some(
            SECP256K1_CONTEXT
                .verify_ecdsa(&message, &sig.to_standard(), &public)
                .is_ok(),
        )
    }
}

/// libp2p protobuf-encoded keys in standard base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct Libp2pCodec;

impl KeyCodec for Libp2pCodec {
    fn scheme(&self) -> KeyScheme {
        KeyScheme::Libp2p
    }

    fn verify(&self, encoded: &str, message: &[u8], signature: &[u8]) -> Option<bool> {
        let raw = STANDARD.decode(encoded).ok()?;
        let public = libp2p::identity::PublicKey::try_decode_protobuf(&raw).ok()?;
        Some(public.verify(message, signature))
    }
}

/// An ordered list of codecs. The default order is secp256k1, then libp2p.
pub struct KeyCodecs {
    codecs: Vec<Box<dyn KeyCodec>>,
}

impl KeyCodecs {
    pub fn new(codecs: Vec<Box<dyn KeyCodec>>) -> Self {
        Self { codecs }
    }

    /// Verify `signature` over `message` under whichever scheme decodes
    /// `encoded_key` first.
    ///
    /// # Errors
    ///
    /// [`KeyError::Undecodable`] when no codec recognises the key.
    pub fn verify(
        &self,
        encoded_key: &str,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, KeyError> {
        for codec in &self.codecs {
            if let Some(verdict) = codec.verify(encoded_key, message, signature) {
                tracing::trace!(scheme = %codec.scheme(), verdict, "signature checked");
                return Ok(verdict);
            }
        }
        Err(KeyError::Undecodable)
    }

    /// The scheme that would handle `encoded_key`, if any.
    pub fn detect(&self, encoded_key: &str) -> Option<KeyScheme> {
        // An empty signature never verifies, but decoding still succeeds.
        self.codecs
            .iter()
            .find(|c| c.verify(encoded_key, &[0u8; HASH_OUTPUT_LENGTH], &[]).is_some())
            .map(|c| c.scheme())
    }
}

impl Default for KeyCodecs {
    fn default() -> Self {
        Self::new(vec![Box::new(Secp256k1Codec), Box::new(Libp2pCodec)])
    }
}

impl fmt::Debug for KeyCodecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|c| c.scheme()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;

    #[test]
    fn secp256k1_sign_verify() {
        let key = SigningKey::generate(KeyScheme::Secp256k1);
        let digest = sha256(b"block");
        let sig = key.sign(&digest).unwrap();
        assert_eq!(sig.len(), SECP256K1_SIGNATURE_LENGTH);

        let codecs = KeyCodecs::default();
        assert!(codecs.verify(&key.public_key_encoded(), &digest, &sig).unwrap());
    }

    #[test]
    fn secp256k1_signature_must_be_exact() {
        let key = SigningKey::generate(KeyScheme::Secp256k1);
        let public = key.public_key_encoded();
        let digest = sha256(b"block");
        let sig = key.sign(&digest).unwrap();
        let codecs = KeyCodecs::default();

        let mut padded = sig.clone();
        padded.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(!codecs.verify(&public, &digest, &padded).unwrap());

        assert!(!codecs.verify(&public, &digest, &sig[..64]).unwrap());

        let mut flipped = sig.clone();
        flipped[64] ^= 1;
        assert!(!codecs.verify(&public, &digest, &flipped).unwrap());

        let mut bad_id = sig;
        bad_id[64] = 7;
        assert!(!codecs.verify(&public, &digest, &bad_id).unwrap());
    }

    #[test]
    fn libp2p_sign_verify() {
        let key = SigningKey::generate(KeyScheme::Libp2p);
        let digest = sha256(b"block");
        let sig = key.sign(&digest).unwrap();

        let codecs = KeyCodecs::default();
        assert!(codecs.verify(&key.public_key_encoded(), &digest, &sig).unwrap());
    }

    #[test]
    fn wrong_message_is_false_not_error() {
        for scheme in [KeyScheme::Secp256k1, KeyScheme::Libp2p] {
            let key = SigningKey::generate(scheme);
            let sig = key.sign(&sha256(b"one")).unwrap();
            let verdict = KeyCodecs::default()
                .verify(&key.public_key_encoded(), &sha256(b"two"), &sig)
                .unwrap();
            assert!(!verdict, "{scheme} accepted a signature over another digest");
        }
    }

    #[test]
    fn garbage_key_is_undecodable() {
        let err = KeyCodecs::default()
            .verify("!!not a key!!", &sha256(b"x"), &[1, 2, 3])
            .unwrap_err();
        assert!(matches!(err, KeyError::Undecodable));
    }

    #[test]
    fn uncompressed_secp256k1_key_decodes() {
        let key = SigningKey::generate(KeyScheme::Secp256k1);
        let SigningKey::Secp256k1(secret) = &key else {
            unreachable!()
        };
        let public = PublicKey::from_secret_key(&SECP256K1_CONTEXT, secret);
        let encoded = URL_SAFE_NO_PAD.encode(public.serialize_uncompressed());

        let digest = sha256(b"uncompressed");
        let sig = key.sign(&digest).unwrap();
        assert!(KeyCodecs::default().verify(&encoded, &digest, &sig).unwrap());
    }

    #[test]
    fn detect_scheme() {
        let codecs = KeyCodecs::default();
        let eth = SigningKey::generate(KeyScheme::Secp256k1);
        let legacy = SigningKey::generate(KeyScheme::Libp2p);
        assert_eq!(
            codecs.detect(&eth.public_key_encoded()),
            Some(KeyScheme::Secp256k1)
        );
        assert_eq!(
            codecs.detect(&legacy.public_key_encoded()),
            Some(KeyScheme::Libp2p)
        );
        assert_eq!(codecs.detect("nope"), None);
    }

    #[test]
    fn secret_bytes_roundtrip() {
        for scheme in [KeyScheme::Secp256k1, KeyScheme::Libp2p] {
            let key = SigningKey::generate(scheme);
            let bytes = key.to_secret_bytes().unwrap();
            let restored = SigningKey::from_secret_bytes(scheme, &bytes).unwrap();
            assert_eq!(key.public_key_encoded(), restored.public_key_encoded());
        }
    }

    #[test]
    fn secp256k1_rejects_non_digest_input() {
        let key = SigningKey::generate(KeyScheme::Secp256k1);
        assert!(matches!(
            key.sign(b"short"),
            Err(KeyError::InvalidDigestLength(5))
        ));
    }

    #[test]
    fn scheme_parsing() {
        assert_eq!("secp256k1".parse::<KeyScheme>().unwrap(), KeyScheme::Secp256k1);
        assert_eq!("LIBP2P".parse::<KeyScheme>().unwrap(), KeyScheme::Libp2p);
        assert!("rsa".parse::<KeyScheme>().is_err());
    }
}
