//! # AES-256-GCM Encryption
//!
//! Symmetric sealing of trx payloads with a group's shared cipher key, and
//! the body cipher of recipient envelopes (see [`super::recipients`]).
//!
//! ## Nonce management
//!
//! Random 96-bit nonces from the OS RNG, one per message. GCM is
//! unforgiving about nonce reuse under one key, so never derive nonces
//! from counters or trx fields.
//!
//! ## Wire format
//!
//! [`encrypt`] returns `nonce || ciphertext || tag`. [`decrypt`] expects
//! exactly that layout.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH};

/// Errors that can occur during encryption/decryption.
///
/// Deliberately coarse: the difference between "wrong key" and "corrupted
/// ciphertext" is nobody's business.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("invalid key length: expected {AES_KEY_LENGTH} bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("ciphertext too short: must be at least {AES_NONCE_LENGTH} bytes")]
    CiphertextTooShort,
}

/// Encrypt plaintext with AES-256-GCM under a 32-byte key.
///
/// The key arrives as a slice because group cipher keys are decoded from
/// hex configuration at runtime; its length is checked here.
///
/// # Example
///
/// ```
/// use quorum_ledger::crypto::encryption::{encrypt, decrypt};
///
/// let key = [0x42u8; 32];
/// let sealed = encrypt(&key, b"group post").unwrap();
/// assert_eq!(decrypt(&key, &sealed).unwrap(), b"group post");
/// ```
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = cipher_for(key)?;

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EncryptionError::EncryptFailed)?;

    let mut out = Vec::with_capacity(AES_NONCE_LENGTH + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt data previously sealed with [`encrypt`].
pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if data.len() < AES_NONCE_LENGTH {
        return Err(EncryptionError::CiphertextTooShort);
    }

    let (nonce_bytes, ciphertext) = data.split_at(AES_NONCE_LENGTH);
    let cipher = cipher_for(key)?;
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| EncryptionError::DecryptFailed)
}

/// Generate a fresh random group cipher key.
pub fn generate_key() -> [u8; AES_KEY_LENGTH] {
    let mut key = [0u8; AES_KEY_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut key);
    key
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, EncryptionError> {
    if key.len() != AES_KEY_LENGTH {
        return Err(EncryptionError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| EncryptionError::InvalidKeyLength(key.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AES_TAG_LENGTH;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"the quick brown fox jumps over the lazy dog";

        let sealed = encrypt(&key, plaintext).unwrap();
        let recovered = decrypt(&key, &sealed).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_ciphertext_length() {
        let key = test_key();
        let plaintext = b"exactly 26 bytes of input!";
        let sealed = encrypt(&key, plaintext).unwrap();
        assert_eq!(
            sealed.len(),
            AES_NONCE_LENGTH + plaintext.len() + AES_TAG_LENGTH
        );
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let key = test_key();
        let sealed = encrypt(&key, b"secret").unwrap();

        let mut wrong_key = test_key();
        wrong_key[0] ^= 0xFF;

        assert!(decrypt(&wrong_key, &sealed).is_err());
    }

    #[test]
    fn test_modified_ciphertext_fails_decryption() {
        let key = test_key();
        let mut sealed = encrypt(&key, b"secret").unwrap();
        sealed[AES_NONCE_LENGTH] ^= 0xFF;

        assert!(decrypt(&key, &sealed).is_err());
    }

    #[test]
    fn test_unique_nonces() {
        let key = test_key();
        let sealed1 = encrypt(&key, b"message").unwrap();
        let sealed2 = encrypt(&key, b"message").unwrap();
        assert_ne!(&sealed1[..AES_NONCE_LENGTH], &sealed2[..AES_NONCE_LENGTH]);
    }

    #[test]
    fn test_short_key_rejected() {
        let short_key = [0u8; 16];
        assert!(matches!(
            encrypt(&short_key, b"test"),
            Err(EncryptionError::InvalidKeyLength(16))
        ));
    }

    #[test]
    fn test_decrypt_too_short() {
        let key = test_key();
        assert!(matches!(
            decrypt(&key, &[0u8; 4]),
            Err(EncryptionError::CiphertextTooShort)
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
