//! # Block Structure
//!
//! A block bundles the trxs agreed for one epoch of a group's chain.
//!
//! ## Block Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  content preimage                           │
//! │  ├── epoch: u64                             │
//! │  ├── group_id: String                       │
//! │  ├── prev_content_hash: Option<[u8; 32]>    │
//! │  └── trxs: Vec<Trx>                         │
//! ├─────────────────────────────────────────────┤
//! │  content_hash: [u8; 32]                     │
//! │  witnesses: Vec<Witness>                    │
//! │  producer_pubkey: String                    │
//! │  timestamp: i64                             │
//! ├─────────────────────────────────────────────┤
//! │  bookkeeping_signature: Vec<u8>             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Two Hashes
//!
//! The **content hash** is SHA-256 over the first section only. It is what
//! producers agree on, what witnesses sign, and what the next block links
//! to. Producer identity, witnesses and timestamp can never change it.
//!
//! The **bookkeeping hash** is SHA-256 over everything above the signature
//! line, content hash included. The producer signs it, vouching for the
//! block as a whole. It is recomputed on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::codec::{self, EncodingError};
use crate::crypto::hash::Hash;
use crate::transaction::Trx;

/// A signature over a block's content hash by a consensus participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub witness_pubkey: String,
    pub signature: Vec<u8>,
}

/// One epoch of a group's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Genesis is epoch 0.
    pub epoch: u64,
    pub group_id: String,
    /// Content hash of the predecessor. `None` only for genesis.
    pub prev_content_hash: Option<Hash>,
    pub trxs: Vec<Trx>,
    pub content_hash: Hash,
    pub witnesses: Vec<Witness>,
    /// Encoded public key of the producer that signed the block.
    pub producer_pubkey: String,
    /// Production time, Unix nanoseconds.
    pub timestamp: i64,
    pub bookkeeping_signature: Vec<u8>,
}

#[derive(Serialize)]
pub(crate) struct ContentPreimage<'a> {
    epoch: u64,
    group_id: &'a str,
    prev_content_hash: Option<&'a Hash>,
    trxs: &'a [Trx],
}

#[derive(Serialize)]
pub(crate) struct BookkeepingPreimage<'a> {
    epoch: u64,
    group_id: &'a str,
    prev_content_hash: Option<&'a Hash>,
    trxs: &'a [Trx],
    content_hash: &'a Hash,
    witnesses: &'a [Witness],
    producer_pubkey: &'a str,
    timestamp: i64,
}

impl Block {
    pub(crate) fn content_preimage(&self) -> ContentPreimage<'_> {
        ContentPreimage {
            epoch: self.epoch,
            group_id: &self.group_id,
            prev_content_hash: self.prev_content_hash.as_ref(),
            trxs: &self.trxs,
        }
    }

    pub(crate) fn bookkeeping_preimage(&self) -> BookkeepingPreimage<'_> {
        BookkeepingPreimage {
            epoch: self.epoch,
            group_id: &self.group_id,
            prev_content_hash: self.prev_content_hash.as_ref(),
            trxs: &self.trxs,
            content_hash: &self.content_hash,
            witnesses: &self.witnesses,
            producer_pubkey: &self.producer_pubkey,
            timestamp: self.timestamp,
        }
    }

    /// Wire/storage encoding of the full block.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        codec::decode(bytes)
    }

    pub fn is_genesis(&self) -> bool {
        self.epoch == 0 && self.prev_content_hash.is_none()
    }

    pub fn trx_count(&self) -> usize {
        self.trxs.len()
    }

    pub fn content_hash_hex(&self) -> String {
        hex::encode(self.content_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            epoch: 3,
            group_id: "g".into(),
            prev_content_hash: Some([1; 32]),
            trxs: Vec::new(),
            content_hash: [2; 32],
            witnesses: vec![Witness {
                witness_pubkey: "w".into(),
                signature: vec![3; 65],
            }],
            producer_pubkey: "p".into(),
            timestamp: 99,
            bookkeeping_signature: vec![4; 65],
        }
    }

    #[test]
    fn bookkeeping_preimage_extends_content_preimage() {
        let block = sample_block();
        let content = codec::encode(&block.content_preimage()).unwrap();
        let bookkeeping = codec::encode(&block.bookkeeping_preimage()).unwrap();
        assert!(bookkeeping.starts_with(&content));
        assert!(bookkeeping.len() > content.len());
    }

    #[test]
    fn bookkeeping_preimage_is_block_minus_signature() {
        let block = sample_block();
        let full = block.to_bytes().unwrap();
        let pre = codec::encode(&block.bookkeeping_preimage()).unwrap();
        assert_eq!(full.len(), pre.len() + 8 + 65);
        assert!(full.starts_with(&pre));
    }

    #[test]
    fn wire_roundtrip_is_stable() {
        let block = sample_block();
        let bytes = block.to_bytes().unwrap();
        let back = Block::from_bytes(&bytes).unwrap();
        assert_eq!(back, block);
        assert_eq!(back.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = sample_block().to_bytes().unwrap();
        assert!(Block::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
