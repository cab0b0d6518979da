//! Group descriptors: the slice of group configuration the ledger core
//! needs to build transactions.

use serde::{Deserialize, Serialize};

/// How posts in a group are encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroupEncryptMode {
    /// Every payload is sealed with the shared group cipher key.
    #[default]
    Public,
    /// Posts are sealed to each announced member's encryption key.
    /// Non-post trxs still use the shared cipher key.
    Private,
}

/// Externally managed group configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub group_id: String,
    pub encrypt_mode: GroupEncryptMode,
    /// Hex-encoded 32-byte AES key shared by all members.
    pub cipher_key: String,
    /// This node's encoded signing public key in the group.
    pub user_sign_pubkey: String,
}

impl GroupDescriptor {
    pub fn new(
        group_id: impl Into<String>,
        encrypt_mode: GroupEncryptMode,
        cipher_key: impl Into<String>,
        user_sign_pubkey: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            encrypt_mode,
            cipher_key: cipher_key.into(),
            user_sign_pubkey: user_sign_pubkey.into(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.encrypt_mode == GroupEncryptMode::Private
    }
}
