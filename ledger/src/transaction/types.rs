//! Core type definitions for group transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TrxType
// ---------------------------------------------------------------------------

/// Discriminant for what a transaction carries.
///
/// The variant order is part of the canonical encoding. Append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrxType {
    /// Application-level key/value configuration.
    AppConfig,
    /// Chain-level configuration (auth mode, allow/deny lists).
    ChainConfig,
    /// Producer registration or removal.
    Producer,
    /// User registration or removal.
    User,
    /// Member announcing its signing and encryption keys.
    Announce,
    /// Content schema update.
    Schema,
    /// Arbitrary content post.
    Post,
    /// Ask peers for the block after a given one.
    ReqBlockForward,
    /// Ask peers for the block before a given one.
    ReqBlockBackward,
    /// Answer to a block request.
    ReqBlockResp,
    /// Notice that a producer finalized a block.
    BlockProduced,
}

impl TrxType {
    /// Trxs that travel outside the sender's ordered nonce stream.
    pub fn is_out_of_stream(&self) -> bool {
        matches!(
            self,
            Self::ReqBlockForward | Self::ReqBlockBackward | Self::ReqBlockResp | Self::BlockProduced
        )
    }
}

impl fmt::Display for TrxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AppConfig => "APP_CONFIG",
            Self::ChainConfig => "CHAIN_CONFIG",
            Self::Producer => "PRODUCER",
            Self::User => "USER",
            Self::Announce => "ANNOUNCE",
            Self::Schema => "SCHEMA",
            Self::Post => "POST",
            Self::ReqBlockForward => "REQ_BLOCK_FORWARD",
            Self::ReqBlockBackward => "REQ_BLOCK_BACKWARD",
            Self::ReqBlockResp => "REQ_BLOCK_RESP",
            Self::BlockProduced => "BLOCK_PRODUCED",
        };
        f.write_str(s)
    }
}
