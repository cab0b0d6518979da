// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Quorum Ledger — Core Library
//!
//! The ledger core of a permissioned, group-scoped blockchain: how
//! transactions and blocks are built, canonically encoded, hashed, signed
//! and verified, and how a block is accepted on top of the one it extends.
//!
//! ## Architecture
//!
//! - **codec** — Canonical binary encoding. Every hash starts here.
//! - **transaction** — Trx records, the engine that seals and signs them,
//!   verification, and the per-group factory.
//! - **block** — Blocks, the block engine, and chain validation.
//! - **chain** — In-memory tip tracking on top of the validator.
//! - **crypto** — Hashing, symmetric and recipient encryption, key schemes.
//! - **keystore** — The injected signing/encryption service.
//! - **nonce** — The injected per-signer nonce source.
//! - **group** — The group descriptor the factory is bound to.
//! - **config** — Protocol constants and runtime knobs.
//!
//! Gossip, persistence and the agreement protocol live elsewhere. They
//! hand this crate a key store and a nonce source and consume its
//! canonical bytes.
//!
//! ## Invariants
//!
//! 1. A block's content hash depends only on epoch, group, previous link
//!    and trxs.
//! 2. Each block links to its predecessor's content hash and carries the
//!    next epoch.
//! 3. Blocks signed under either key scheme verify through one entry point.

pub mod block;
pub mod chain;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod group;
pub mod keystore;
pub mod nonce;
pub mod transaction;

pub use block::{is_block_valid, Block, BlockEngine, BlockError, Producer, ValidationError, Witness};
pub use chain::{ChainError, ChainState};
pub use config::LedgerConfig;
pub use group::{GroupDescriptor, GroupEncryptMode};
pub use keystore::{KeyStore, KeyStoreError, LocalKeyStore, SignerRef};
pub use nonce::{MemoryNonceSource, NonceError, NonceSource};
pub use transaction::{verify_trx, FactoryError, TransactionError, Trx, TrxEngine, TrxFactory, TrxType};
