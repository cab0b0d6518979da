//! # CLI Interface
//!
//! Defines the command-line argument structure for `quorum` using `clap`
//! derive. Subcommands: `keygen`, `genesis`, `verify`, `inspect` and
//! `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use quorum_ledger::crypto::keys::KeyScheme;

/// Quorum ledger tooling.
///
/// Generates signing keys, produces genesis blocks, and checks or
/// inspects blocks in their canonical encoding.
#[derive(Parser, Debug)]
#[command(
    name = "quorum",
    about = "Quorum ledger key and block tooling",
    version,
    propagate_version = true
)]
pub struct QuorumCli {
    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "QUORUM_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "QUORUM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `quorum` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a signing key and write it to a key file.
    Keygen(KeygenArgs),
    /// Build and sign a genesis block for a group.
    Genesis(GenesisArgs),
    /// Verify a block's producer signature, or validate it against its
    /// predecessor.
    Verify(VerifyArgs),
    /// Print a block as JSON.
    Inspect(InspectArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Key scheme: `secp256k1` or the legacy `libp2p`.
    #[arg(long, default_value = "secp256k1")]
    pub scheme: KeyScheme,

    /// Where to write the JSON key file. Must not exist.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

/// Arguments for the `genesis` subcommand.
#[derive(Args, Debug)]
pub struct GenesisArgs {
    #[arg(long)]
    pub group_id: String,

    /// Producer key file written by `keygen`.
    #[arg(long, short = 'k')]
    pub key: PathBuf,

    /// Where to write the encoded block.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Encoded block to check.
    #[arg(long, short = 'b')]
    pub block: PathBuf,

    /// Encoded predecessor. When given, the full chain validation runs.
    #[arg(long, short = 'p')]
    pub prev: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long, short = 'b')]
    pub block: PathBuf,
}
