//! # Transaction Module
//!
//! Construction, signing and verification of group transactions, plus the
//! per-group factory that produces each transaction kind.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TrxType
//! trx.rs          — The Trx record, its signing preimage and wire format
//! engine.rs       — TrxEngine: encrypt, stamp, sign
//! verification.rs — verify_trx across key schemes
//! items.rs        — Typed payloads (config, registration, block requests)
//! factory.rs      — TrxFactory: nonce + encryption policy per trx kind
//! error.rs        — TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TrxEngine::build_unsigned`] seals the payload and
//!    returns the trx with its signing hash.
//! 2. **Sign** — [`TrxEngine::sign`] asks the key store for a signature.
//! 3. **Verify** — receivers run [`verify_trx`].
//!
//! A trx is never re-signed. A retry is a new trx with a new id and nonce.

pub mod engine;
pub mod error;
pub mod factory;
pub mod items;
pub mod trx;
pub mod types;
pub mod verification;

pub use engine::TrxEngine;
pub use error::TransactionError;
pub use factory::{FactoryError, TrxFactory};
pub use trx::Trx;
pub use types::TrxType;
pub use verification::{verify_trx, verify_trx_with};
