//! In-memory chain tracking gated by block validation.
//!
//! [`ChainState`] holds the accepted blocks of one group, genesis first.
//! It is a plain value; callers that share it across threads wrap it in
//! their own lock.

use thiserror::Error;

use crate::block::{
    content_hash, is_block_valid, verify_signature, Block, BlockError, ValidationError,
};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("genesis producer signature does not verify")]
    GenesisSignatureInvalid,

    #[error("genesis content hash does not match its contents")]
    GenesisContentHashMismatch,

    #[error("block at epoch {epoch} is not a genesis block")]
    NotGenesis { epoch: u64 },

    #[error("chain already has a genesis block")]
    AlreadyAnchored,

    #[error("chain has no genesis block")]
    Unanchored,

    #[error("block rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Ordered chain of validated blocks for one group.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    blocks: Vec<Block>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a chain from a verified genesis block.
    pub fn from_genesis(genesis: Block) -> Result<Self, ChainError> {
        let mut chain = Self::new();
        chain.anchor(genesis)?;
        Ok(chain)
    }

    /// Accept `genesis` as the root of this chain.
    pub fn anchor(&mut self, genesis: Block) -> Result<(), ChainError> {
        if !self.blocks.is_empty() {
            return Err(ChainError::AlreadyAnchored);
        }
        if !genesis.is_genesis() || !genesis.trxs.is_empty() {
            return Err(ChainError::NotGenesis {
                epoch: genesis.epoch,
            });
        }
        if content_hash(&genesis)? != genesis.content_hash {
            return Err(ChainError::GenesisContentHashMismatch);
        }
        if !verify_signature(&genesis)? {
            return Err(ChainError::GenesisSignatureInvalid);
        }
        tracing::info!(
            group_id = %genesis.group_id,
            content_hash = %genesis.content_hash_hex(),
            "chain anchored"
        );
        self.blocks.push(genesis);
        Ok(())
    }

    /// Validate `block` against the tip and append it.
    pub fn append(&mut self, block: Block) -> Result<(), ChainError> {
        let tip = self.blocks.last().ok_or(ChainError::Unanchored)?;
        is_block_valid(&block, tip)?;
        self.blocks.push(block);
        Ok(())
    }

    /// Latest accepted block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Epoch of the tip.
    pub fn epoch(&self) -> Option<u64> {
        self.tip().map(|b| b.epoch)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
