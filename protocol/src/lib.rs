// Copyright (c) 2026 Tessera Contributors. Apache-2.0 License.
// See LICENSE for details.

//! # Tessera Protocol: Core Library
//!
//! Builds the unit of record of a signed ledger, links it to its owner's
//! previous record, signs it, gives it a content-derived identifier, and
//! reads chains of such records back from a store in a guaranteed order.
//!
//! ## Architecture
//!
//! - **crypto**: SHA-256, BLAKE3 domain-separated hashing, Ed25519 keys.
//! - **types**: 32-byte identifiers for transactions, users, asset groups, assets.
//! - **transaction**: assets, relations, witnesses, digest, wire format, verification.
//! - **chain**: ordered chain queries and predecessor lookup.
//! - **transport**: the store boundary (`LedgerTransport`, `StoreStatus`).
//! - **keystore**: where witness keypairs come from.
//! - **assembler**: the register workflow tying everything together.
//! - **storage**: `LedgerDb`, a sled-backed local store.
//! - **config**: protocol constants and `LedgerConfig`.
//!
//! ## Quick Start
//!
//! ```
//! use tessera_protocol::assembler::TransactionAssembler;
//! use tessera_protocol::config::LedgerConfig;
//! use tessera_protocol::crypto::Keypair;
//! use tessera_protocol::keystore::MemoryKeyStore;
//! use tessera_protocol::storage::LedgerDb;
//! use tessera_protocol::types::UserId;
//!
//! let store = LedgerDb::open_temporary().unwrap();
//! let keys = MemoryKeyStore::new();
//! let keypair = Keypair::generate();
//! let user = UserId::from_public_key(&keypair.public_key());
//! keys.insert(user, keypair);
//!
//! let assembler = TransactionAssembler::new(LedgerConfig::for_group("inventory"));
//! let first = assembler.register(&store, &keys, user, b"v1".to_vec()).unwrap();
//! let second = assembler.register(&store, &keys, user, b"v2".to_vec()).unwrap();
//!
//! let pointer = second.relation(0).unwrap().pointer().unwrap();
//! assert_eq!(Some(pointer.transaction_id), first.id());
//! ```

pub mod assembler;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod keystore;
pub mod storage;
pub mod transaction;
pub mod transport;
pub mod types;
