//! Accepting a block on top of the one it extends.
//!
//! Validation is chain-inductive: a candidate is checked against its
//! already-accepted predecessor only. Nothing here walks the chain or
//! mutates either block.

use thiserror::Error;

use super::engine::{content_hash, verify_signature, BlockError};
use super::types::Block;

/// Why a candidate block was rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The stored content hash does not match the block's content.
    #[error("content hash mismatch at epoch {epoch}")]
    ContentHashMismatch { epoch: u64 },

    /// The candidate does not link to the predecessor's content hash.
    #[error("block at epoch {epoch} does not link to its predecessor")]
    PrevLinkMismatch { epoch: u64 },

    #[error("epoch {got} does not follow predecessor, expected {expected}")]
    EpochSequence { expected: u64, got: u64 },

    /// The producer signature does not verify.
    #[error("producer signature invalid at epoch {epoch}")]
    SignatureInvalid { epoch: u64 },

    /// The block could not be hashed or its producer key decoded.
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Check `candidate` against `predecessor`.
///
/// Checks run in order and stop at the first failure:
///
/// 1. the stored content hash matches a recomputation,
/// 2. `prev_content_hash` is the predecessor's content hash,
/// 3. the epoch is exactly one past the predecessor's,
/// 4. the producer signature verifies.
///
/// Witness signatures are not checked here; see
/// [`verify_witnesses`](super::verify_witnesses).
pub fn is_block_valid(candidate: &Block, predecessor: &Block) -> Result<(), ValidationError> {
    let epoch = candidate.epoch;

    if content_hash(candidate)? != candidate.content_hash {
        tracing::warn!(group_id = %candidate.group_id, epoch, "content hash mismatch");
        return Err(ValidationError::ContentHashMismatch { epoch });
    }

    if candidate.prev_content_hash != Some(predecessor.content_hash) {
        tracing::warn!(group_id = %candidate.group_id, epoch, "previous link mismatch");
        return Err(ValidationError::PrevLinkMismatch { epoch });
    }

    let expected = predecessor.epoch.saturating_add(1);
    if epoch != expected {
        tracing::warn!(group_id = %candidate.group_id, epoch, expected, "epoch out of sequence");
        return Err(ValidationError::EpochSequence {
            expected,
            got: epoch,
        });
    }

    if !verify_signature(candidate)? {
        return Err(ValidationError::SignatureInvalid { epoch });
    }

    tracing::debug!(group_id = %candidate.group_id, epoch, "block accepted");
    Ok(())
}
