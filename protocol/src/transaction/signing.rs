//! Witness signing.
//!
//! Signing is a separate step from building because a witness's key may not
//! be available where the transaction is assembled. Each witness signs the
//! same [`Transaction::signable_digest`], so signatures can be collected in
//! any order.

use super::builder::Transaction;
use super::error::TransactionError;
use super::witness::SignatureEntry;
use crate::crypto::keys::Keypair;
use crate::crypto::signatures;
use crate::types::UserId;

/// Produces `user_id`'s signature entry for `tx` without attaching it.
///
/// The caller is responsible for `keypair` belonging to `user_id`; user ids
/// are opaque and not derived from keys here.
///
/// # Errors
///
/// - [`TransactionError::UnknownSigner`] if `user_id` is not a declared
///   witness.
/// - Structural errors from [`Transaction::validate_structure`].
pub fn sign(
    tx: &Transaction,
    user_id: UserId,
    keypair: &Keypair,
) -> Result<SignatureEntry, TransactionError> {
    if !tx.witness().is_declared(&user_id) {
        return Err(TransactionError::UnknownSigner { user: user_id });
    }
    let digest = tx.signable_digest()?;
    Ok(SignatureEntry {
        user_id,
        public_key: keypair.public_key(),
        signature: signatures::sign(keypair, &digest),
    })
}

/// Signs `tx` as `user_id` and stores the entry in its witness.
pub fn sign_and_attach(
    tx: &mut Transaction,
    user_id: UserId,
    keypair: &Keypair,
) -> Result<(), TransactionError> {
    let entry = sign(tx, user_id, keypair)?;
    tx.attach_signature(entry)?;
    tracing::trace!(user = %user_id, "witness signature attached");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetGroupId;

    fn draft(users: &[UserId]) -> Transaction {
        let mut tx = Transaction::with_timestamp(42);
        let rel = tx.new_relation(0).unwrap();
        for user in users {
            rel.attach_asset(AssetGroupId::from_name("g"), *user, b"p".to_vec());
        }
        for user in users {
            tx.declare_witness(*user).unwrap();
        }
        tx
    }

    fn identity() -> (UserId, Keypair) {
        let kp = Keypair::generate();
        (UserId::from_public_key(&kp.public_key()), kp)
    }

    #[test]
    fn signature_verifies_over_digest() {
        let (user, kp) = identity();
        let tx = draft(&[user]);
        let entry = sign(&tx, user, &kp).unwrap();
        let digest = tx.signable_digest().unwrap();
        assert!(entry.public_key.verify(&digest, &entry.signature));
        assert_eq!(entry.signature.as_bytes().len(), 64);
    }

    #[test]
    fn undeclared_user_cannot_sign() {
        let (user, kp) = identity();
        let (stranger, _) = identity();
        let tx = draft(&[user]);
        assert_eq!(
            sign(&tx, stranger, &kp).unwrap_err(),
            TransactionError::UnknownSigner { user: stranger }
        );
    }

    #[test]
    fn signing_twice_rejected() {
        let (user, kp) = identity();
        let mut tx = draft(&[user]);
        sign_and_attach(&mut tx, user, &kp).unwrap();
        assert_eq!(
            sign_and_attach(&mut tx, user, &kp),
            Err(TransactionError::DuplicateSignature { user })
        );
    }

    #[test]
    fn signing_order_does_not_change_id() {
        let (a, ka) = identity();
        let (b, kb) = identity();
        let base = draft(&[a, b]);

        let mut ab = base.clone();
        sign_and_attach(&mut ab, a, &ka).unwrap();
        sign_and_attach(&mut ab, b, &kb).unwrap();

        let mut ba = base;
        sign_and_attach(&mut ba, b, &kb).unwrap();
        sign_and_attach(&mut ba, a, &ka).unwrap();

        assert_eq!(ab.finalize(true).unwrap(), ba.finalize(true).unwrap());
    }

    #[test]
    fn sealed_transaction_rejects_signature() {
        let (user, kp) = identity();
        let mut tx = draft(&[user]);
        tx.finalize(false).unwrap();
        assert_eq!(
            sign_and_attach(&mut tx, user, &kp),
            Err(TransactionError::SealedTransactionMutation)
        );
    }
}
