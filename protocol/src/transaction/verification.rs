//! Verification of finalized transactions.
//!
//! Every transaction the store accepts and every element of a fetched chain
//! passes [`verify_transaction`]. Checks run cheapest first: structure, then
//! hashing, then one Ed25519 verification per witness.

use super::builder::Transaction;
use super::error::TransactionError;
use crate::crypto::signatures::verify_checked;

/// Verifies a sealed transaction end to end.
///
/// The checks, in order:
///
/// 1. **Sealed**: the transaction carries an identifier.
/// 2. **Structure**: no empty relation, every count within wire limits.
/// 3. **Identifier**: the embedded id equals the recomputed one.
/// 4. **Pointers**: no relation points at its own transaction.
/// 5. **Witness complete**: every declared witness signed exactly once.
/// 6. **Signatures**: each entry verifies over the signable digest.
///
/// # Errors
///
/// Returns the first failing check as a [`TransactionError`].
pub fn verify_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    // 1. Sealed.
    let claimed = tx.id().ok_or(TransactionError::NotFinalized)?;

    // 2. Structure.
    tx.validate_structure()?;

    // 3. Identifier integrity.
    let expected = tx.compute_id()?;
    if expected != claimed {
        return Err(TransactionError::IdMismatch {
            expected,
            actual: claimed,
        });
    }

    // 4. Self reference.
    tx.check_self_reference(&claimed)?;

    // 5. Witness completeness.
    if !tx.witness().is_complete() {
        return Err(TransactionError::IncompleteWitness {
            missing: tx.witness().missing_signers(),
        });
    }

    // 6. Signatures.
    let digest = tx.signable_digest()?;
    for entry in tx.witness().signatures() {
        verify_checked(&entry.public_key, &digest, &entry.signature).map_err(|_| {
            TransactionError::InvalidSignature {
                user: entry.user_id,
            }
        })?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
