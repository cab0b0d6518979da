//! # Block Module
//!
//! Blocks, the engine that builds and signs them, and the validator that
//! accepts a block on top of its predecessor.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      — Block and Witness records, hash preimages, wire format
//! engine.rs     — BlockEngine (genesis/next), hashes, signature checks
//! validation.rs — is_block_valid: the four ordered acceptance checks
//! ```

pub mod engine;
pub mod types;
pub mod validation;

pub use engine::{
    bookkeeping_hash, collect_trxs, content_hash, verify_signature, verify_signature_with,
    verify_witnesses, BlockEngine, BlockError, Producer,
};
pub use types::{Block, Witness};
pub use validation::{is_block_valid, ValidationError};
