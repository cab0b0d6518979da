//! # Recipient Envelopes
//!
//! Posts in a private group are sealed to every announced member's X25519
//! encryption key instead of the shared group cipher key.
//!
//! ## Construction
//!
//! 1. Draw a random 32-byte *file key* and seal the plaintext body with
//!    AES-256-GCM under it.
//! 2. For each recipient, generate a fresh ephemeral X25519 secret, run DH
//!    against the recipient key, and derive a wrapping key:
//!
//!    ```text
//!    wrap_key = BLAKE3-derive-key(RECIPIENT_KDF_CONTEXT,
//!                                 shared_secret || ephemeral_pub || recipient_pub)
//!    ```
//!
//! 3. Seal the file key under the wrapping key. One stanza per recipient.
//!
//! The ephemeral secret is dropped right after its single DH, so compromise
//! of a member's long-term key exposes only what was sealed to that member.
//!
//! The envelope travels as canonical bytes ([`crate::codec`]).

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use super::encryption::{self, EncryptionError};
use super::hash::derive_key;
use crate::codec::{self, EncodingError};
use crate::config::{RECIPIENT_KDF_CONTEXT, X25519_KEY_LENGTH};

/// Errors produced while sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum RecipientError {
    #[error("no recipients given")]
    NoRecipients,

    #[error("invalid recipient key: {0}")]
    InvalidRecipientKey(String),

    #[error("envelope is not addressed to this key")]
    NotARecipient,

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// One wrapped copy of the file key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stanza {
    /// Ephemeral X25519 public key used for this recipient.
    pub ephemeral_public: [u8; X25519_KEY_LENGTH],
    /// The file key sealed under the derived wrapping key.
    pub wrapped_key: Vec<u8>,
}

/// A multi-recipient sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub stanzas: Vec<Stanza>,
    pub body: Vec<u8>,
}

/// An X25519 keypair used to receive private-group posts.
pub struct RecipientKey {
    secret: StaticSecret,
}

impl RecipientKey {
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    pub fn from_bytes(bytes: [u8; X25519_KEY_LENGTH]) -> Self {
        Self {
            secret: StaticSecret::from(bytes),
        }
    }

    pub fn to_bytes(&self) -> [u8; X25519_KEY_LENGTH] {
        self.secret.to_bytes()
    }

    pub fn public_bytes(&self) -> [u8; X25519_KEY_LENGTH] {
        PublicKey::from(&self.secret).to_bytes()
    }

    /// The hex form recipients are announced under.
    pub fn public_hex(&self) -> String {
        hex::encode(self.public_bytes())
    }

    /// Open an envelope addressed to this key.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, RecipientError> {
        let envelope: Envelope = codec::decode(sealed)?;
        let our_public = self.public_bytes();

        for stanza in &envelope.stanzas {
            let peer = PublicKey::from(stanza.ephemeral_public);
            let shared = self.secret.diffie_hellman(&peer);
            let wrap_key = derive_key(
                RECIPIENT_KDF_CONTEXT,
                &[
                    shared.as_bytes().as_slice(),
                    stanza.ephemeral_public.as_slice(),
                    our_public.as_slice(),
                ],
            );
            // Stanzas for other members fail authentication; keep looking.
            if let Ok(file_key) = encryption::decrypt(&wrap_key, &stanza.wrapped_key) {
                return Ok(encryption::decrypt(&file_key, &envelope.body)?);
            }
        }

        Err(RecipientError::NotARecipient)
    }
}

impl std::fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecipientKey(pub={})", self.public_hex())
    }
}

/// Seal `plaintext` to every hex-encoded X25519 key in `recipients`.
pub fn seal_to(plaintext: &[u8], recipients: &[String]) -> Result<Vec<u8>, RecipientError> {
    if recipients.is_empty() {
        return Err(RecipientError::NoRecipients);
    }

    let file_key = encryption::generate_key();
    let body = encryption::encrypt(&file_key, plaintext)?;

    let mut stanzas = Vec::with_capacity(recipients.len());
    for recipient in recipients {
        let recipient_public = parse_recipient(recipient)?;
        let ephemeral = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_public = PublicKey::from(&ephemeral).to_bytes();
        let shared = ephemeral.diffie_hellman(&PublicKey::from(recipient_public));
        let wrap_key = derive_key(
            RECIPIENT_KDF_CONTEXT,
            &[
                shared.as_bytes().as_slice(),
                ephemeral_public.as_slice(),
                recipient_public.as_slice(),
            ],
        );
        stanzas.push(Stanza {
            ephemeral_public,
            wrapped_key: encryption::encrypt(&wrap_key, &file_key)?,
        });
    }

    Ok(codec::encode(&Envelope { stanzas, body })?)
}

fn parse_recipient(encoded: &str) -> Result<[u8; X25519_KEY_LENGTH], RecipientError> {
    let bytes =
        hex::decode(encoded).map_err(|e| RecipientError::InvalidRecipientKey(e.to_string()))?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        RecipientError::InvalidRecipientKey(format!(
            "expected {X25519_KEY_LENGTH} bytes, got {}",
            b.len()
        ))
    })
}
