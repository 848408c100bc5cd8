// Copyright (c) 2026 Tessera Contributors. Apache-2.0 License.
// See LICENSE for details.

//! # Tessera Client
//!
//! Entry point for the `tessera` binary. Parses CLI arguments, initializes
//! logging, and runs one command against the local store.
//!
//! The binary supports four subcommands:
//!
//! - `init`     generate a keypair and write the ID file
//! - `register` register a transaction chained to the user's latest one
//! - `history`  list the user's chain
//! - `version`  print build version information

mod cli;
mod identity;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use tessera_protocol::assembler::TransactionAssembler;
use tessera_protocol::chain::{fetch_chain, ChainQuery, Direction};
use tessera_protocol::config::LedgerConfig;
use tessera_protocol::crypto::Keypair;
use tessera_protocol::storage::LedgerDb;
use tessera_protocol::transaction::Transaction;
use tessera_protocol::types::UserId;

use cli::{Commands, TesseraCli};
use identity::{FileKeyStore, IdFile};

fn main() -> Result<()> {
    let cli = TesseraCli::parse();
    logging::init_logging(cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Init(args) => init_identity(&cli.data_dir, &args),
        Commands::Register(args) => register(&cli.data_dir, &args),
        Commands::History(args) => history(&cli.data_dir, &args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn key_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("keys")
}

fn open_store(data_dir: &Path) -> Result<LedgerDb> {
    let path = data_dir.join("ledger");
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create store directory: {}", path.display()))?;
    LedgerDb::open(&path).with_context(|| format!("failed to open store at {}", path.display()))
}

/// Generates a keypair, stores it, and writes the ID file.
fn init_identity(data_dir: &Path, args: &cli::InitArgs) -> Result<()> {
    if args.id_file.exists() {
        bail!(
            "ID file {} already exists; refusing to overwrite",
            args.id_file.display()
        );
    }

    let keypair = Keypair::generate();
    let user_id = UserId::from_public_key(&keypair.public_key());
    FileKeyStore::new(key_dir(data_dir)).store(&user_id, &keypair)?;
    IdFile { id: user_id }.write(&args.id_file)?;

    tracing::info!(user = %user_id, id_file = %args.id_file.display(), "identity created");

    println!("Identity initialized.");
    println!("  User id    : {}", user_id);
    println!("  Public key : {}", keypair.public_key());
    println!("  ID file    : {}", args.id_file.display());
    println!("  Keys       : {}", key_dir(data_dir).display());
    Ok(())
}

/// Registers one transaction, chained to the user's latest.
fn register(data_dir: &Path, args: &cli::RegisterArgs) -> Result<()> {
    let user_id = IdFile::read(&args.user.id_file)?.id;
    let payload = payload(args.body.as_deref())?;

    let store = open_store(data_dir)?;
    let keys = FileKeyStore::new(key_dir(data_dir));
    let assembler = TransactionAssembler::new(LedgerConfig::for_group(&args.user.asset_group));

    let tx = assembler
        .register(&store, &keys, user_id, payload)
        .context("failed to register transaction")?;
    store.flush().context("failed to flush store")?;

    println!("****** registered transaction is as follows:");
    print_transaction(&tx);
    Ok(())
}

/// Lists the user's chain.
fn history(data_dir: &Path, args: &cli::HistoryArgs) -> Result<()> {
    let user_id = IdFile::read(&args.user.id_file)?.id;
    let config = LedgerConfig::for_group(&args.user.asset_group);
    let direction = if args.ascending {
        Direction::Ascending
    } else {
        Direction::Descending
    };

    let store = open_store(data_dir)?;
    let query =
        ChainQuery::latest(user_id, config.asset_group_id, args.limit).with_direction(direction);
    let chain = fetch_chain(&store, &query).context("failed to fetch chain")?;

    if chain.is_empty() {
        println!("No transactions for user {user_id}.");
        return Ok(());
    }
    for tx in &chain {
        print_transaction(tx);
        println!();
    }
    Ok(())
}

/// The asset body: the given JSON document, or a sample record.
fn payload(body: Option<&str>) -> Result<Vec<u8>> {
    let value = match body {
        Some(raw) => serde_json::from_str::<serde_json::Value>(raw)
            .context("--body must be a JSON document")?,
        None => serde_json::json!({
            "item_a": 1000,
            "item_b": "xxxx",
            "item_c": "0123456789",
        }),
    };
    Ok(serde_json::to_vec(&value)?)
}

fn print_transaction(tx: &Transaction) {
    match tx.id() {
        Some(id) => println!("transaction_id : {id}"),
        None => println!("transaction_id : (draft)"),
    }
    println!("version        : {}", tx.version());
    println!("timestamp      : {}", tx.timestamp());
    for relation in tx.relations() {
        println!("relation[{}]", relation.index());
        for asset in relation.assets() {
            println!("  asset_id       : {}", asset.asset_id());
            println!("  asset_group_id : {}", asset.asset_group_id());
            println!("  user_id        : {}", asset.user_id());
            println!("  body           : {}", String::from_utf8_lossy(asset.body()));
        }
        if let Some(pointer) = relation.pointer() {
            println!("  pointer        : {}", pointer.transaction_id);
        }
    }
    for entry in tx.witness().signatures() {
        println!("witness        : {} (key {})", entry.user_id, entry.public_key);
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("tessera   {}", env!("CARGO_PKG_VERSION"));
    println!("protocol  {}", tessera_protocol::config::PROTOCOL_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_payload_is_sample_record() {
        let bytes = payload(None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["item_a"], 1000);
        assert_eq!(value["item_b"], "xxxx");
    }

    #[test]
    fn body_must_be_json() {
        assert!(payload(Some("{\"k\": [1, 2]}")).is_ok());
        assert!(payload(Some("not json")).is_err());
    }

    #[test]
    fn init_then_register_twice_chains() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let id_file = dir.path().join("ID_FILE");

        init_identity(
            &data_dir,
            &cli::InitArgs {
                id_file: id_file.clone(),
            },
        )
        .unwrap();
        assert!(init_identity(&data_dir, &cli::InitArgs { id_file: id_file.clone() }).is_err());

        let args = cli::RegisterArgs {
            user: cli::UserArgs {
                id_file: id_file.clone(),
                asset_group: "test_asset_group".to_string(),
            },
            body: None,
        };
        register(&data_dir, &args).unwrap();
        register(&data_dir, &args).unwrap();

        let user_id = IdFile::read(&id_file).unwrap().id;
        let store = open_store(&data_dir).unwrap();
        let chain = fetch_chain(
            &store,
            &ChainQuery::latest(user_id, LedgerConfig::for_group("test_asset_group").asset_group_id, 10),
        )
        .unwrap();
        assert_eq!(chain.len(), 2);
        let pointer = chain[0].relation(0).unwrap().pointer().unwrap();
        assert_eq!(Some(pointer.transaction_id), chain[1].id());
    }
}
