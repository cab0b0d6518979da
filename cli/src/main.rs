// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Quorum CLI
//!
//! Entry point for the `quorum` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand against the ledger library:
//!
//! - `keygen`:  generate a secp256k1 or libp2p signing key
//! - `genesis`: build and sign a group's genesis block
//! - `verify`:  check a block's signature or validate it on its predecessor
//! - `inspect`: dump a block as JSON
//! - `version`: print build version information

mod cli;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};

use quorum_ledger::block::{bookkeeping_hash, verify_signature, verify_witnesses};
use quorum_ledger::codec;
use quorum_ledger::crypto::keys::{KeyCodecs, KeyScheme, SigningKey};
use quorum_ledger::{is_block_valid, Block, BlockEngine, LocalKeyStore, Producer, SignerRef};

use cli::{Commands, QuorumCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = QuorumCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format))?;

    match cli.command {
        Commands::Keygen(args) => {
            let public = keygen(args.scheme, &args.out)?;
            println!("{public}");
            Ok(())
        }
        Commands::Genesis(args) => {
            let block = genesis(&args.group_id, &args.key, &args.out)?;
            println!("{}", block.content_hash_hex());
            Ok(())
        }
        Commands::Verify(args) => {
            let block = read_block(&args.block)?;
            match args.prev {
                Some(prev) => {
                    let prev = read_block(&prev)?;
                    is_block_valid(&block, &prev)
                        .with_context(|| format!("block at epoch {} rejected", block.epoch))?;
                }
                None => {
                    if !verify_signature(&block)? {
                        bail!("producer signature invalid at epoch {}", block.epoch);
                    }
                }
            }
            println!("ok: epoch {} {}", block.epoch, block.content_hash_hex());
            Ok(())
        }
        Commands::Inspect(args) => {
            let block = read_block(&args.block)?;
            println!("{}", serde_json::to_string_pretty(&inspect(&block)?)?);
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Key files
// ---------------------------------------------------------------------------

/// On-disk signing key: `{ "scheme": "secp256k1", "secret": "<hex>" }`.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    scheme: KeyScheme,
    secret: String,
}

/// Generate a key under `scheme`, write it to `out`, return its public key.
fn keygen(scheme: KeyScheme, out: &Path) -> Result<String> {
    if out.exists() {
        bail!("refusing to overwrite existing key file {}", out.display());
    }
    let key = SigningKey::generate(scheme);
    let file = KeyFile {
        scheme,
        secret: hex::encode(key.to_secret_bytes()?),
    };
    std::fs::write(out, serde_json::to_vec_pretty(&file)?)
        .with_context(|| format!("failed to write key file {}", out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(out, std::fs::Permissions::from_mode(0o600))?;
    }

    let public = key.public_key_encoded();
    tracing::info!(%scheme, public_key = %public, path = %out.display(), "signing key generated");
    Ok(public)
}

fn load_key(path: &Path) -> Result<SigningKey> {
    let raw = std::fs::read(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    let file: KeyFile = serde_json::from_slice(&raw)
        .with_context(|| format!("malformed key file {}", path.display()))?;
    let secret = hex::decode(&file.secret).context("key file secret is not hex")?;
    Ok(SigningKey::from_secret_bytes(file.scheme, &secret)?)
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn read_block(path: &Path) -> Result<Block> {
    let raw =
        std::fs::read(path).with_context(|| format!("failed to read block {}", path.display()))?;
    Block::from_bytes(&raw).with_context(|| format!("malformed block {}", path.display()))
}

/// Build a genesis block for `group_id` signed by the key at `key_path`.
fn genesis(group_id: &str, key_path: &Path, out: &Path) -> Result<Block> {
    let key = load_key(key_path)?;
    let ks = Arc::new(LocalKeyStore::new());
    let signer = SignerRef::group(group_id);
    let pubkey = ks.insert_signing_key(signer.clone(), key);

    let block = BlockEngine::new(ks)
        .build_genesis(group_id, &Producer { pubkey, signer })
        .context("failed to build genesis block")?;
    std::fs::write(out, block.to_bytes()?)
        .with_context(|| format!("failed to write block {}", out.display()))?;

    tracing::info!(
        group_id,
        content_hash = %block.content_hash_hex(),
        path = %out.display(),
        "genesis block written"
    );
    Ok(block)
}

#[derive(Debug, Serialize)]
struct TrxView<'a> {
    trx_id: &'a str,
    trx_type: String,
    sender_pubkey: &'a str,
    nonce: u64,
    data_len: usize,
    timestamp: String,
    expired: String,
}

#[derive(Debug, Serialize)]
struct BlockView<'a> {
    epoch: u64,
    group_id: &'a str,
    prev_content_hash: Option<String>,
    content_hash: String,
    bookkeeping_hash: String,
    producer_pubkey: &'a str,
    producer_scheme: Option<String>,
    timestamp: String,
    encoded_len: usize,
    signature_valid: bool,
    /// Set when the check could not run, e.g. an undecodable producer key.
    signature_error: Option<String>,
    witnesses: usize,
    witnesses_valid: bool,
    witnesses_error: Option<String>,
    trxs: Vec<TrxView<'a>>,
}

/// Split a check into its verdict and, if it errored, the error text.
fn check_outcome<E: std::fmt::Display>(
    result: std::result::Result<bool, E>,
) -> (bool, Option<String>) {
    match result {
        Ok(valid) => (valid, None),
        Err(e) => (false, Some(e.to_string())),
    }
}

fn format_nanos(nanos: i64) -> String {
    Utc.timestamp_nanos(nanos).to_rfc3339()
}

/// Human-readable view of a block with hex hashes and check results.
fn inspect(block: &Block) -> Result<BlockView<'_>> {
    let trxs = block
        .trxs
        .iter()
        .map(|t| TrxView {
            trx_id: &t.trx_id,
            trx_type: t.trx_type.to_string(),
            sender_pubkey: &t.sender_pubkey,
            nonce: t.nonce,
            data_len: t.data.len(),
            timestamp: format_nanos(t.timestamp),
            expired: format_nanos(t.expired),
        })
        .collect();

    let (signature_valid, signature_error) = check_outcome(verify_signature(block));
    let (witnesses_valid, witnesses_error) = check_outcome(verify_witnesses(block));

    Ok(BlockView {
        epoch: block.epoch,
        group_id: &block.group_id,
        prev_content_hash: block.prev_content_hash.map(hex::encode),
        content_hash: block.content_hash_hex(),
        bookkeeping_hash: hex::encode(bookkeeping_hash(block)?),
        producer_pubkey: &block.producer_pubkey,
        producer_scheme: KeyCodecs::default()
            .detect(&block.producer_pubkey)
            .map(|s| s.to_string()),
        timestamp: format_nanos(block.timestamp),
        encoded_len: codec::encoded_len(block)?,
        signature_valid,
        signature_error,
        witnesses: block.witnesses.len(),
        witnesses_valid,
        witnesses_error,
        trxs,
    })
}

/// Prints version information to stdout.
fn print_version() {
    println!("quorum   {}", env!("CARGO_PKG_VERSION"));
    println!("protocol {}", quorum_ledger::config::PROTOCOL_VERSION);
}
