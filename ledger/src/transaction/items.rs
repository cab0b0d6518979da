//! Typed payloads carried inside transactions.
//!
//! Each item is encoded with the canonical codec and becomes the plaintext
//! that the transaction engine seals into `Trx::data`.

use serde::{Deserialize, Serialize};

/// Whether an item adds or removes an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Add,
    Remove,
}

/// Value type of an application config entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppConfigType {
    Int,
    Bool,
    String,
}

/// Application-level key/value setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfigItem {
    pub group_id: String,
    pub action: Action,
    pub name: String,
    pub value_type: AppConfigType,
    pub value: String,
    pub memo: String,
    pub owner_pubkey: String,
    pub timestamp: i64,
}

/// Who may post which trx types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    FollowAllowList,
    FollowDenyList,
}

/// Chain-level configuration change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainConfigChange {
    /// Switch the auth mode of one trx type.
    SetTrxAuthMode { trx_type: super::TrxType, mode: AuthMode },
    /// Add or remove a pubkey on the allow list for the given trx types.
    UpdateAllowList {
        action: Action,
        pubkey: String,
        trx_types: Vec<super::TrxType>,
    },
    /// Add or remove a pubkey on the deny list for the given trx types.
    UpdateDenyList {
        action: Action,
        pubkey: String,
        trx_types: Vec<super::TrxType>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfigItem {
    pub group_id: String,
    pub change: ChainConfigChange,
    pub owner_pubkey: String,
    pub memo: String,
    pub timestamp: i64,
}

/// Producer registration or removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerItem {
    pub group_id: String,
    pub producer_pubkey: String,
    pub action: Action,
    pub group_owner_pubkey: String,
    pub memo: String,
    pub timestamp: i64,
}

/// User registration or removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserItem {
    pub group_id: String,
    pub user_pubkey: String,
    /// Hex X25519 key other members seal private posts to.
    pub encrypt_pubkey: String,
    pub action: Action,
    pub group_owner_pubkey: String,
    pub memo: String,
    pub timestamp: i64,
}

/// Role a member announces itself under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnounceRole {
    Producer,
    User,
}

/// A member publishing its signing and encryption keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnounceItem {
    pub group_id: String,
    pub sign_pubkey: String,
    pub encrypt_pubkey: String,
    pub role: AnnounceRole,
    pub action: Action,
    pub memo: String,
    pub timestamp: i64,
}

/// Content schema for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaItem {
    pub group_id: String,
    pub schema_type: String,
    pub schema_json: String,
    pub action: Action,
    pub owner_pubkey: String,
    pub timestamp: i64,
}

/// Request for the block after (or before) `epoch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqBlock {
    pub group_id: String,
    pub epoch: u64,
    /// Signing pubkey of the requesting member.
    pub user_id: String,
}

/// Outcome of a block request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReqBlkResult {
    /// The requested block is attached.
    BlockInTrx,
    /// The provider has no block past the one asked about.
    BlockNotFound,
}

/// Answer to a [`ReqBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqBlockResp {
    pub result: ReqBlkResult,
    pub provider_pubkey: String,
    pub requester_pubkey: String,
    pub group_id: String,
    pub epoch: u64,
    /// Canonical bytes of the block.
    pub block: Vec<u8>,
}
