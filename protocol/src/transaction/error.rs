//! Errors raised while building, signing, digesting and verifying a
//! transaction.
//!
//! Construction errors (`DuplicateIndex`, `PointerAlreadySet`,
//! `UnknownSigner`, `DuplicateSignature`, ...) are programming errors local to
//! one call. Nothing here is retried.

use thiserror::Error;

use crate::types::{TransactionId, UserId};

/// Everything that can go wrong with a [`super::Transaction`] in memory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// A relation with this index already exists in the transaction.
    #[error("relation index {index} is already in use")]
    DuplicateIndex { index: u16 },

    /// No relation with this index exists in the transaction.
    #[error("no relation with index {index}")]
    UnknownRelation { index: u16 },

    /// The relation already carries a pointer.
    #[error("relation {index} already has a pointer")]
    PointerAlreadySet { index: u16 },

    /// The relation has neither an asset nor a pointer.
    #[error("relation {index} has neither an asset nor a pointer")]
    EmptyRelation { index: u16 },

    /// A count or length does not fit the wire format.
    #[error("too many {what}: limit is {limit}, got {got}")]
    LimitExceeded {
        what: &'static str,
        limit: usize,
        got: usize,
    },

    /// The user was never declared as a witness.
    #[error("user {user} is not a declared witness")]
    UnknownSigner { user: UserId },

    /// The witness already holds a signature from this user.
    #[error("user {user} has already signed")]
    DuplicateSignature { user: UserId },

    /// The transaction has been digested and can no longer change.
    #[error("transaction is sealed; mutation rejected")]
    SealedTransactionMutation,

    /// `finalize` was called while declared witnesses are still unsigned.
    #[error("witness incomplete: {} signature(s) missing", .missing.len())]
    IncompleteWitness { missing: Vec<UserId> },

    /// The operation needs a finalized transaction.
    #[error("transaction has not been finalized")]
    NotFinalized,

    /// A pointer references the transaction that contains it.
    #[error("relation {index} points at its own transaction")]
    SelfReference { index: u16 },

    /// The embedded identifier is not the digest of the content.
    #[error("transaction ID mismatch: expected {expected}, got {actual}")]
    IdMismatch {
        expected: TransactionId,
        actual: TransactionId,
    },

    /// A witness signature does not verify against its embedded public key.
    #[error("invalid signature from user {user}")]
    InvalidSignature { user: UserId },
}
