//! # Key Store
//!
//! The signing and encryption service the engines depend on. It is always
//! passed in explicitly (usually as `Arc<dyn KeyStore>`); nothing in this
//! crate reaches for an ambient global keystore.
//!
//! Implementations may sit on a hardware module or a remote signer, so
//! every call is potentially slow and blocking. Callers must not hold a
//! lock across one.
//!
//! [`LocalKeyStore`] is the in-process implementation used by tests and the
//! CLI.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use thiserror::Error;

use crate::crypto::encryption::{self, EncryptionError};
use crate::crypto::keys::{KeyCodecs, KeyError, KeyScheme, SigningKey};
use crate::crypto::recipients::{self, RecipientError, RecipientKey};

/// Errors reported by a key store backend.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("no signing key for {0}")]
    UnknownSigner(SignerRef),

    #[error("no encryption key named {0:?}")]
    UnknownEncryptKey(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Recipients(#[from] RecipientError),

    #[error("key store backend error: {0}")]
    Backend(String),
}

/// Which stored key signs.
///
/// By default a node signs with the key registered under the group id;
/// an alias selects any other named key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignerRef {
    /// The key registered for a group.
    KeyName(String),
    /// A key registered under an explicit alias.
    KeyAlias(String),
}

impl SignerRef {
    pub fn group(group_id: impl Into<String>) -> Self {
        Self::KeyName(group_id.into())
    }

    pub fn alias(alias: impl Into<String>) -> Self {
        Self::KeyAlias(alias.into())
    }
}

impl fmt::Display for SignerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyName(name) => write!(f, "key name {name:?}"),
            Self::KeyAlias(alias) => write!(f, "key alias {alias:?}"),
        }
    }
}

/// Signing and encryption service consumed by the engines.
pub trait KeyStore: Send + Sync {
    /// Sign a 32-byte digest with the key `signer` refers to.
    fn sign(&self, signer: &SignerRef, digest: &[u8]) -> Result<Vec<u8>, KeyStoreError>;

    /// Seal `plaintext` under a shared symmetric key.
    fn encrypt_symmetric(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, KeyStoreError>;

    /// Seal `plaintext` to every recipient public key.
    fn encrypt_to(&self, plaintext: &[u8], recipients: &[String])
        -> Result<Vec<u8>, KeyStoreError>;

    /// Verify a signature under any supported public-key scheme.
    fn verify(&self, message: &[u8], signature: &[u8], pubkey: &str) -> Result<bool, KeyError> {
        KeyCodecs::default().verify(pubkey, message, signature)
    }
}

// ---------------------------------------------------------------------------
// LocalKeyStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Keys {
    signing: HashMap<SignerRef, SigningKey>,
    encrypt: HashMap<String, RecipientKey>,
}

/// In-memory key store.
#[derive(Default)]
pub struct LocalKeyStore {
    keys: RwLock<Keys>,
}

impl LocalKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a signing key under `scheme`, store it, and return its
    /// encoded public key.
    pub fn generate_signing_key(&self, signer: SignerRef, scheme: KeyScheme) -> String {
        self.insert_signing_key(signer, SigningKey::generate(scheme))
    }

    /// Store an existing signing key. Returns its encoded public key.
    pub fn insert_signing_key(&self, signer: SignerRef, key: SigningKey) -> String {
        let public = key.public_key_encoded();
        tracing::debug!(%signer, scheme = %key.scheme(), "signing key stored");
        self.keys.write().signing.insert(signer, key);
        public
    }

    /// Encoded public key of a stored signing key.
    pub fn public_key(&self, signer: &SignerRef) -> Option<String> {
        self.keys
            .read()
            .signing
            .get(signer)
            .map(SigningKey::public_key_encoded)
    }

    /// Generate an X25519 encryption key named `name` and return the hex
    /// public key recipients address posts to.
    pub fn generate_encrypt_key(&self, name: impl Into<String>) -> String {
        let key = RecipientKey::generate();
        let public = key.public_hex();
        self.keys.write().encrypt.insert(name.into(), key);
        public
    }

    /// Open a recipient envelope with the named encryption key.
    pub fn decrypt_for(&self, name: &str, sealed: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
        let keys = self.keys.read();
        let key = keys
            .encrypt
            .get(name)
            .ok_or_else(|| KeyStoreError::UnknownEncryptKey(name.to_string()))?;
        Ok(key.open(sealed)?)
    }

    /// Open a payload sealed with a shared group key.
    pub fn decrypt_symmetric(&self, sealed: &[u8], key: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
        Ok(encryption::decrypt(key, sealed)?)
    }
}

impl KeyStore for LocalKeyStore {
    fn sign(&self, signer: &SignerRef, digest: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
        let keys = self.keys.read();
        let key = keys
            .signing
            .get(signer)
            .ok_or_else(|| KeyStoreError::UnknownSigner(signer.clone()))?;
        Ok(key.sign(digest)?)
    }

    fn encrypt_symmetric(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
        Ok(encryption::encrypt(key, plaintext)?)
    }

    fn encrypt_to(
        &self,
        plaintext: &[u8],
        recipients: &[String],
    ) -> Result<Vec<u8>, KeyStoreError> {
        Ok(recipients::seal_to(plaintext, recipients)?)
    }
}

impl fmt::Debug for LocalKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.keys.read();
        f.debug_struct("LocalKeyStore")
            .field("signing_keys", &keys.signing.len())
            .field("encrypt_keys", &keys.encrypt.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;

    #[test]
    fn sign_with_group_key_and_alias() {
        let ks = LocalKeyStore::new();
        let group_pub = ks.generate_signing_key(SignerRef::group("g1"), KeyScheme::Secp256k1);
        let alias_pub = ks.generate_signing_key(SignerRef::alias("ops"), KeyScheme::Libp2p);
        let digest = sha256(b"payload");

        let sig = ks.sign(&SignerRef::group("g1"), &digest).unwrap();
        assert!(ks.verify(&digest, &sig, &group_pub).unwrap());

        let sig = ks.sign(&SignerRef::alias("ops"), &digest).unwrap();
        assert!(ks.verify(&digest, &sig, &alias_pub).unwrap());
    }

    #[test]
    fn unknown_signer_is_error() {
        let ks = LocalKeyStore::new();
        let err = ks.sign(&SignerRef::group("missing"), &[0u8; 32]).unwrap_err();
        assert!(matches!(err, KeyStoreError::UnknownSigner(_)));
    }

    #[test]
    fn group_name_and_alias_are_distinct_slots() {
        let ks = LocalKeyStore::new();
        ks.generate_signing_key(SignerRef::group("same"), KeyScheme::Secp256k1);
        assert!(ks.public_key(&SignerRef::alias("same")).is_none());
    }

    #[test]
    fn encrypt_to_and_decrypt_for() {
        let ks = LocalKeyStore::new();
        let alice = ks.generate_encrypt_key("alice");
        let sealed = ks.encrypt_to(b"hello", &[alice]).unwrap();
        assert_eq!(ks.decrypt_for("alice", &sealed).unwrap(), b"hello");
        assert!(matches!(
            ks.decrypt_for("bob", &sealed),
            Err(KeyStoreError::UnknownEncryptKey(_))
        ));
    }

    #[test]
    fn symmetric_roundtrip() {
        let ks = LocalKeyStore::new();
        let key = [7u8; 32];
        let sealed = ks.encrypt_symmetric(b"group data", &key).unwrap();
        assert_eq!(ks.decrypt_symmetric(&sealed, &key).unwrap(), b"group data");
    }

    #[test]
    fn debug_never_prints_keys() {
        let ks = LocalKeyStore::new();
        ks.generate_signing_key(SignerRef::group("g"), KeyScheme::Secp256k1);
        let rendered = format!("{ks:?}");
        assert!(rendered.contains("signing_keys: 1"));
    }
}
