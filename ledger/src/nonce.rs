//! # Nonce Source
//!
//! Per-(group, signer) sequence numbers. The issuing service is external;
//! the ledger core only calls [`NonceSource::next_nonce`] and trusts it to
//! be monotonic for the source's lifetime.
//!
//! [`MemoryNonceSource`] is an in-process implementation for tests and
//! single-node tooling.

use dashmap::DashMap;
use thiserror::Error;

/// Errors reported by a nonce source.
#[derive(Debug, Error)]
pub enum NonceError {
    /// The sequence for this (group, signer) cannot advance any further.
    #[error("nonce space exhausted for group {group_id} signer {signer}")]
    Exhausted { group_id: String, signer: String },

    #[error("nonce source error: {0}")]
    Backend(String),
}

/// Issues the next nonce for a signer in a group.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self, group_id: &str, signer_hint: &str) -> Result<u64, NonceError>;
}

/// In-memory, monotonic nonce counters keyed by (group, signer).
///
/// The first nonce issued for a key is 1; 0 is reserved for trxs outside
/// the ordered stream.
#[derive(Debug, Default)]
pub struct MemoryNonceSource {
    counters: DashMap<(String, String), u64>,
}

impl MemoryNonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the counter for a key at `last`; the next issued nonce is
    /// `last + 1`.
    pub fn resume_from(&self, group_id: &str, signer: &str, last: u64) {
        self.counters
            .insert((group_id.to_string(), signer.to_string()), last);
    }

    /// Last nonce issued for a key, if any.
    pub fn current(&self, group_id: &str, signer: &str) -> Option<u64> {
        self.counters
            .get(&(group_id.to_string(), signer.to_string()))
            .map(|v| *v)
    }
}

impl NonceSource for MemoryNonceSource {
    fn next_nonce(&self, group_id: &str, signer_hint: &str) -> Result<u64, NonceError> {
        let mut entry = self
            .counters
            .entry((group_id.to_string(), signer_hint.to_string()))
            .or_insert(0);
        let next = entry.checked_add(1).ok_or_else(|| NonceError::Exhausted {
            group_id: group_id.to_string(),
            signer: signer_hint.to_string(),
        })?;
        *entry = next;
        Ok(next)
    }
}
