//! Block construction, hashing and signature checks.

use std::sync::Arc;

use thiserror::Error;

use super::types::{Block, Witness};
use crate::codec::{self, EncodingError};
use crate::crypto::hash::{sha256, Hash};
use crate::crypto::keys::{KeyCodecs, KeyError};
use crate::keystore::{KeyStore, KeyStoreError, SignerRef};
use crate::transaction::engine::now_nanos;
use crate::transaction::Trx;

/// Errors raised while building or checking a block.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The signing backend produced zero bytes.
    #[error("signing backend produced an empty signature")]
    EmptySignature,

    /// A successor was requested for an epoch that does not follow its
    /// predecessor.
    #[error("epoch {got} does not follow predecessor, expected {expected}")]
    EpochSequence { expected: u64, got: u64 },

    /// No supported scheme could decode a producer or witness key.
    #[error("block key is undecodable: {0}")]
    KeyDecode(#[source] KeyError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

/// The identity a block is produced under: the public key recorded in the
/// block and the stored key that signs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Producer {
    pub pubkey: String,
    pub signer: SignerRef,
}

/// Builds and signs blocks against an injected key store.
#[derive(Clone)]
pub struct BlockEngine {
    keystore: Arc<dyn KeyStore>,
}

impl BlockEngine {
    pub fn new(keystore: Arc<dyn KeyStore>) -> Self {
        Self { keystore }
    }

    /// Build and sign epoch 0 of `group_id`'s chain.
    pub fn build_genesis(&self, group_id: &str, producer: &Producer) -> Result<Block, BlockError> {
        let mut block = Block {
            epoch: 0,
            group_id: group_id.to_string(),
            prev_content_hash: None,
            trxs: Vec::new(),
            content_hash: [0; 32],
            witnesses: Vec::new(),
            producer_pubkey: String::new(),
            timestamp: 0,
            bookkeeping_signature: Vec::new(),
        };
        block.content_hash = content_hash(&block)?;
        self.seal(block, Vec::new(), producer)
    }

    /// Build and sign the block that follows `predecessor`.
    ///
    /// `trxs` are copied into the block; later changes to the caller's
    /// values do not reach it.
    ///
    /// # Errors
    ///
    /// [`BlockError::EpochSequence`] unless `epoch == predecessor.epoch + 1`.
    pub fn build_next(
        &self,
        predecessor: &Block,
        epoch: u64,
        trxs: &[Trx],
        witnesses: Vec<Witness>,
        producer: &Producer,
    ) -> Result<Block, BlockError> {
        let expected = predecessor.epoch.saturating_add(1);
        if epoch != expected {
            return Err(BlockError::EpochSequence {
                expected,
                got: epoch,
            });
        }

        let mut block = Block {
            epoch,
            group_id: predecessor.group_id.clone(),
            prev_content_hash: Some(predecessor.content_hash),
            trxs: trxs.to_vec(),
            content_hash: [0; 32],
            witnesses: Vec::new(),
            producer_pubkey: String::new(),
            timestamp: 0,
            bookkeeping_signature: Vec::new(),
        };
        block.content_hash = content_hash(&block)?;
        self.seal(block, witnesses, producer)
    }

    /// Attach the bookkeeping section and the producer signature.
    fn seal(
        &self,
        mut block: Block,
        witnesses: Vec<Witness>,
        producer: &Producer,
    ) -> Result<Block, BlockError> {
        block.witnesses = witnesses;
        block.producer_pubkey = producer.pubkey.clone();
        block.timestamp = now_nanos();

        let hash = bookkeeping_hash(&block)?;
        let signature = self.keystore.sign(&producer.signer, &hash)?;
        if signature.is_empty() {
            return Err(BlockError::EmptySignature);
        }
        block.bookkeeping_signature = signature;

        tracing::debug!(
            group_id = %block.group_id,
            epoch = block.epoch,
            trxs = block.trxs.len(),
            content_hash = %block.content_hash_hex(),
            "block built"
        );
        Ok(block)
    }
}

impl std::fmt::Debug for BlockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockEngine").finish_non_exhaustive()
    }
}

impl Witness {
    /// Sign `content_hash` with the key `signer` refers to.
    pub fn attest(
        keystore: &dyn KeyStore,
        signer: &SignerRef,
        witness_pubkey: impl Into<String>,
        content_hash: &Hash,
    ) -> Result<Self, BlockError> {
        let signature = keystore.sign(signer, content_hash)?;
        if signature.is_empty() {
            return Err(BlockError::EmptySignature);
        }
        Ok(Self {
            witness_pubkey: witness_pubkey.into(),
            signature,
        })
    }
}

// ---------------------------------------------------------------------------
// Hashing and verification
// ---------------------------------------------------------------------------

/// SHA-256 over epoch, group id, previous content hash and trxs.
pub fn content_hash(block: &Block) -> Result<Hash, BlockError> {
    Ok(sha256(&codec::encode(&block.content_preimage())?))
}

/// SHA-256 over the whole block with the producer signature left out.
pub fn bookkeeping_hash(block: &Block) -> Result<Hash, BlockError> {
    Ok(sha256(&codec::encode(&block.bookkeeping_preimage())?))
}

/// Check the producer signature over the bookkeeping hash.
///
/// Returns `Ok(false)` for a signature that does not match.
///
/// # Errors
///
/// [`BlockError::KeyDecode`] only when no supported scheme decodes
/// `producer_pubkey`.
pub fn verify_signature(block: &Block) -> Result<bool, BlockError> {
    verify_signature_with(&KeyCodecs::default(), block)
}

/// [`verify_signature`] against an explicit codec list.
pub fn verify_signature_with(codecs: &KeyCodecs, block: &Block) -> Result<bool, BlockError> {
    let hash = bookkeeping_hash(block)?;
    let verdict = codecs
        .verify(&block.producer_pubkey, &hash, &block.bookkeeping_signature)
        .map_err(BlockError::KeyDecode)?;
    if !verdict {
        tracing::warn!(
            group_id = %block.group_id,
            epoch = block.epoch,
            producer = %block.producer_pubkey,
            "producer signature rejected"
        );
    }
    Ok(verdict)
}

/// Check every witness signature over the block's content hash.
///
/// A block without witnesses passes.
pub fn verify_witnesses(block: &Block) -> Result<bool, BlockError> {
    let codecs = KeyCodecs::default();
    for witness in &block.witnesses {
        let ok = codecs
            .verify(&witness.witness_pubkey, &block.content_hash, &witness.signature)
            .map_err(BlockError::KeyDecode)?;
        if !ok {
            tracing::warn!(
                epoch = block.epoch,
                witness = %witness.witness_pubkey,
                "witness signature rejected"
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Every trx of `blocks`, in block order.
pub fn collect_trxs(blocks: &[Block]) -> Vec<&Trx> {
    blocks.iter().flat_map(|b| b.trxs.iter()).collect()
}
