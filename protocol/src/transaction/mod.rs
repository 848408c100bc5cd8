//! # Transaction Module
//!
//! Construction, signing, digesting and verification of ledger
//! transactions. A [`Transaction`] holds indexed relations, each carrying
//! assets and an optional pointer to its predecessor, plus a witness section
//! listing who must sign.
//!
//! ## Architecture
//!
//! ```text
//! asset.rs        Asset and AssetRef, content-derived asset ids
//! relation.rs     Relation and Pointer
//! witness.rs      Declared signers and their signature entries
//! builder.rs      Transaction: draft state, relations, witness declaration
//! encoding.rs     Canonical byte encoding and strict wire decoding
//! digest.rs       Signable digest, transaction id, finalize/serialize/parse
//! signing.rs      Per-witness Ed25519 signing
//! verification.rs End-to-end checks of a sealed transaction
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: open relations, attach assets and pointers, declare witnesses.
//! 2. **Sign**: each witness calls [`sign_and_attach`] (any order).
//! 3. **Finalize**: [`Transaction::finalize`] computes the id and seals.
//! 4. **Serialize**: [`Transaction::serialize`] produces wire bytes.
//! 5. **Verify**: receivers run [`Transaction::parse`] then [`verify_transaction`].

pub mod asset;
pub mod builder;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod relation;
pub mod signing;
pub mod verification;
pub mod witness;

pub use asset::{Asset, AssetRef};
pub use builder::Transaction;
pub use encoding::DeserializeError;
pub use error::TransactionError;
pub use relation::{Pointer, Relation};
pub use signing::{sign, sign_and_attach};
pub use verification::verify_transaction;
pub use witness::{SignatureEntry, Witness};
