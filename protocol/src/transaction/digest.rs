//! Digesting, sealing and the wire format.
//!
//! Two hashes cover a transaction:
//!
//! - the **signable digest**, a domain-separated BLAKE3 hash over everything
//!   except signatures and identifier. Witnesses sign this, so signatures
//!   never depend on each other.
//! - the **transaction identifier**, `double_sha256` over everything except
//!   the identifier itself, signatures included.

use super::builder::Transaction;
use super::encoding::{self, DeserializeError, Section};
use super::error::TransactionError;
use crate::config::SIGNABLE_DIGEST_CONTEXT;
use crate::crypto::hash::{domain_separated_hash, double_sha256};
use crate::types::TransactionId;

impl Transaction {
    /// Canonical bytes witnesses sign over.
    pub fn signable_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        self.validate_structure()?;
        Ok(encoding::encode(self, Section::Signable))
    }

    /// The 32-byte digest each witness signs.
    pub fn signable_digest(&self) -> Result<[u8; 32], TransactionError> {
        let bytes = self.signable_bytes()?;
        Ok(domain_separated_hash(SIGNABLE_DIGEST_CONTEXT, &bytes))
    }

    /// Identifier the current content hashes to. Does not seal.
    pub fn compute_id(&self) -> Result<TransactionId, TransactionError> {
        self.validate_structure()?;
        let bytes = encoding::encode(self, Section::Content);
        Ok(TransactionId::from_bytes(double_sha256(&bytes)))
    }

    /// Computes the identifier and seals the transaction.
    ///
    /// With `witness_required`, every declared witness must have signed.
    /// Calling this again on a sealed transaction recomputes the identifier
    /// and returns it unchanged when the content still matches.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::EmptyRelation`] or
    ///   [`TransactionError::LimitExceeded`] for a malformed structure.
    /// - [`TransactionError::IncompleteWitness`] when signatures are missing.
    /// - [`TransactionError::SelfReference`] if a pointer names this
    ///   transaction.
    /// - [`TransactionError::IdMismatch`] if an already sealed transaction no
    ///   longer hashes to its identifier.
    pub fn finalize(&mut self, witness_required: bool) -> Result<TransactionId, TransactionError> {
        if witness_required && !self.witness.is_complete() {
            return Err(TransactionError::IncompleteWitness {
                missing: self.witness.missing_signers(),
            });
        }

        let id = self.compute_id()?;
        self.check_self_reference(&id)?;

        match self.id {
            Some(existing) if existing != id => Err(TransactionError::IdMismatch {
                expected: id,
                actual: existing,
            }),
            Some(existing) => Ok(existing),
            None => {
                self.id = Some(id);
                tracing::debug!(tx_id = %id, relations = self.relations.len(), "transaction sealed");
                Ok(id)
            }
        }
    }

    pub(crate) fn check_self_reference(&self, id: &TransactionId) -> Result<(), TransactionError> {
        for relation in &self.relations {
            if let Some(pointer) = relation.pointer() {
                if &pointer.transaction_id == id {
                    return Err(TransactionError::SelfReference {
                        index: relation.index(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Wire bytes of a finalized transaction.
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let id = self.id.ok_or(TransactionError::NotFinalized)?;
        self.validate_structure()?;
        let mut bytes = encoding::encode(self, Section::Content);
        bytes.extend_from_slice(id.as_bytes());
        Ok(bytes)
    }

    /// Parses wire bytes into a sealed transaction.
    ///
    /// The embedded identifier is kept as claimed. Use
    /// [`super::verify_transaction`] to check it and the signatures.
    pub fn parse(bytes: &[u8]) -> Result<Transaction, DeserializeError> {
        encoding::decode(bytes)
    }
}
