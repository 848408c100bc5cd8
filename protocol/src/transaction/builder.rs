//! The draft side of a transaction: relations, assets, pointers and
//! declared witnesses.
//!
//! A [`Transaction`] starts as a draft with no identifier. Every mutating
//! call checks that it is still a draft; once [`Transaction::finalize`] has
//! run, mutation fails with [`TransactionError::SealedTransactionMutation`].
//!
//! Digesting and the wire format live in [`super::digest`], signing in
//! [`super::signing`].

use chrono::Utc;

use super::error::TransactionError;
use super::relation::Relation;
use super::witness::{SignatureEntry, Witness};
use crate::config::TRANSACTION_VERSION;
use crate::types::{TransactionId, UserId};

/// The atomic signed record of the ledger.
///
/// Fields are private so the draft/sealed rule cannot be bypassed. Read
/// access goes through the accessors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) version: u16,
    pub(crate) timestamp: u64,
    pub(crate) relations: Vec<Relation>,
    pub(crate) witness: Witness,
    pub(crate) id: Option<TransactionId>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// An empty draft stamped with the current UTC time in milliseconds.
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now().timestamp_millis() as u64)
    }

    /// An empty draft with an explicit timestamp (Unix milliseconds).
    pub fn with_timestamp(timestamp: u64) -> Self {
        Self {
            version: TRANSACTION_VERSION,
            timestamp,
            relations: Vec::new(),
            witness: Witness::default(),
            id: None,
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, index: u16) -> Option<&Relation> {
        self.relations.iter().find(|r| r.index() == index)
    }

    pub fn witness(&self) -> &Witness {
        &self.witness
    }

    /// The identifier, or `None` while the transaction is a draft.
    pub fn id(&self) -> Option<TransactionId> {
        self.id
    }

    /// `true` once the transaction has been digested.
    pub fn is_sealed(&self) -> bool {
        self.id.is_some()
    }

    fn ensure_draft(&self) -> Result<(), TransactionError> {
        if self.is_sealed() {
            return Err(TransactionError::SealedTransactionMutation);
        }
        Ok(())
    }

    // -- Relations ----------------------------------------------------------

    /// Opens a new relation under `index` and returns it for filling.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::DuplicateIndex`] if `index` is taken.
    /// - [`TransactionError::SealedTransactionMutation`] after finalize.
    pub fn new_relation(&mut self, index: u16) -> Result<&mut Relation, TransactionError> {
        self.ensure_draft()?;
        if self.relation(index).is_some() {
            return Err(TransactionError::DuplicateIndex { index });
        }
        self.relations.push(Relation::new(index));
        let last = self.relations.len() - 1;
        Ok(&mut self.relations[last])
    }

    /// Reopens an existing relation of a draft.
    pub fn relation_mut(&mut self, index: u16) -> Result<&mut Relation, TransactionError> {
        self.ensure_draft()?;
        self.relations
            .iter_mut()
            .find(|r| r.index() == index)
            .ok_or(TransactionError::UnknownRelation { index })
    }

    /// Checks every structural invariant the wire format relies on.
    ///
    /// Runs before signing, digesting and serializing, so an empty relation
    /// never gets that far.
    pub fn validate_structure(&self) -> Result<(), TransactionError> {
        check_limit("relations", self.relations.len(), u16::MAX as usize)?;
        check_limit("witness signers", self.witness.signers().len(), u16::MAX as usize)?;
        for relation in &self.relations {
            if relation.is_empty() {
                return Err(TransactionError::EmptyRelation {
                    index: relation.index(),
                });
            }
            check_limit("assets in a relation", relation.assets().len(), u16::MAX as usize)?;
            for asset in relation.assets() {
                check_limit("asset body bytes", asset.body().len(), u32::MAX as usize)?;
            }
        }
        Ok(())
    }

    // -- Witness ------------------------------------------------------------

    /// Declares `user_id` as a required signer. Idempotent.
    pub fn declare_witness(&mut self, user_id: UserId) -> Result<(), TransactionError> {
        self.ensure_draft()?;
        self.witness.declare(user_id);
        Ok(())
    }

    /// Stores a signature produced by [`super::signing::sign`].
    ///
    /// # Errors
    ///
    /// [`TransactionError::UnknownSigner`], [`TransactionError::DuplicateSignature`],
    /// or [`TransactionError::SealedTransactionMutation`].
    pub fn attach_signature(&mut self, entry: SignatureEntry) -> Result<(), TransactionError> {
        self.ensure_draft()?;
        self.witness.attach(entry)
    }

    /// `true` iff every declared witness has exactly one signature.
    pub fn is_complete(&self) -> bool {
        self.witness.is_complete()
    }
}

fn check_limit(what: &'static str, got: usize, limit: usize) -> Result<(), TransactionError> {
    if got > limit {
        return Err(TransactionError::LimitExceeded { what, limit, got });
    }
    Ok(())
}
