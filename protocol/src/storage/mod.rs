//! # Storage Module
//!
//! Local persistence for Tessera transactions. The transaction core never
//! depends on this module; it talks to any [`crate::transport::LedgerTransport`].
//! [`LedgerDb`] is the reference implementation the client and the
//! integration tests run against.
//!
//! ## Design Decisions
//!
//! 1. **Wire bytes on disk.** Transactions are stored exactly as received,
//!    so what comes back out of a query is byte-identical to what was
//!    signed and hashed.
//!
//! 2. **Bincode for metadata.** Store bookkeeping is compact and private to
//!    this module.

pub mod db;

pub use db::{DbError, DbResult, LedgerDb, StoreInfo};
