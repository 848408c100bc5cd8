//! # CLI Interface
//!
//! Defines the command-line argument structure for `tessera` using `clap`
//! derive. Supports four subcommands: `init`, `register`, `history`, and
//! `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Tessera reference client.
///
/// Creates a user identity, registers transactions chained to the user's
/// previous one, and lists a user's chain from the local store.
#[derive(Parser, Debug)]
#[command(
    name = "tessera",
    about = "Tessera ledger reference client",
    version,
    propagate_version = true
)]
pub struct TesseraCli {
    /// Directory holding the local store and key files.
    #[arg(long, short = 'd', global = true, env = "TESSERA_DATA_DIR", default_value = ".tessera")]
    pub data_dir: PathBuf,

    /// Log output format.
    #[arg(long, global = true, value_enum, env = "TESSERA_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Debug-level logs from the client and protocol library.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `tessera` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a keypair and write the user's ID file.
    Init(InitArgs),
    /// Register a new transaction chained to the user's latest one.
    Register(RegisterArgs),
    /// List the user's transactions.
    History(HistoryArgs),
    /// Print version information and exit.
    Version,
}

/// Which user, and which asset group.
#[derive(Args, Debug, Clone)]
pub struct UserArgs {
    /// JSON file holding the user id, as `{"id": "<hex>"}`.
    #[arg(long = "id-file", short = 'i', env = "TESSERA_ID_FILE", default_value = "ID_FILE")]
    pub id_file: PathBuf,

    /// Human-readable asset group name. Hashed into the asset group id.
    #[arg(long, short = 'g', env = "TESSERA_ASSET_GROUP", default_value = "test_asset_group")]
    pub asset_group: String,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the ID file. Refuses to overwrite an existing one.
    #[arg(long = "id-file", short = 'i', env = "TESSERA_ID_FILE", default_value = "ID_FILE")]
    pub id_file: PathBuf,
}

/// Arguments for the `register` subcommand.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Asset body as a JSON document. Defaults to a sample record.
    #[arg(long, short = 'b')]
    pub body: Option<String>,
}

/// Arguments for the `history` subcommand.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Oldest first instead of newest first.
    #[arg(long)]
    pub ascending: bool,

    /// Maximum number of transactions to list.
    #[arg(long, short = 'n', default_value_t = tessera_protocol::config::DEFAULT_CHAIN_QUERY_LIMIT)]
    pub limit: usize,
}
