//! The witness section: who must sign, and what they signed.
//!
//! Signature entries are kept in the order their signers were declared, no
//! matter in which order they arrive. That makes the encoded witness, and
//! therefore the transaction identifier, independent of signing order.

use super::error::TransactionError;
use crate::crypto::keys::{PublicKey, Signature};
use crate::types::UserId;

/// One signer's contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    /// The declared witness this signature belongs to.
    pub user_id: UserId,
    /// Key the signature verifies against.
    pub public_key: PublicKey,
    /// Ed25519 signature over the signable digest.
    pub signature: Signature,
}

/// Declared signers and their collected signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    signers: Vec<UserId>,
    signatures: Vec<SignatureEntry>,
}

impl Witness {
    /// Adds `user_id` to the expected signers. Declaring twice is a no-op.
    pub fn declare(&mut self, user_id: UserId) {
        if !self.signers.contains(&user_id) {
            self.signers.push(user_id);
        }
    }

    pub fn signers(&self) -> &[UserId] {
        &self.signers
    }

    /// Signature entries in declaration order of their signers.
    pub fn signatures(&self) -> &[SignatureEntry] {
        &self.signatures
    }

    pub fn is_declared(&self, user_id: &UserId) -> bool {
        self.signers.contains(user_id)
    }

    pub fn signature_of(&self, user_id: &UserId) -> Option<&SignatureEntry> {
        self.signatures.iter().find(|e| &e.user_id == user_id)
    }

    fn slot_of(&self, user_id: &UserId) -> Option<usize> {
        self.signers.iter().position(|s| s == user_id)
    }

    /// Stores a signature in its signer's slot.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::UnknownSigner`] if the user was never declared.
    /// - [`TransactionError::DuplicateSignature`] if the user already signed.
    pub fn attach(&mut self, entry: SignatureEntry) -> Result<(), TransactionError> {
        let slot = self
            .slot_of(&entry.user_id)
            .ok_or(TransactionError::UnknownSigner {
                user: entry.user_id,
            })?;
        if self.signature_of(&entry.user_id).is_some() {
            return Err(TransactionError::DuplicateSignature {
                user: entry.user_id,
            });
        }

        // Keep entries sorted by signer slot.
        let position = self
            .signatures
            .iter()
            .position(|e| self.slot_of(&e.user_id).map_or(false, |s| s > slot))
            .unwrap_or(self.signatures.len());
        self.signatures.insert(position, entry);
        Ok(())
    }

    /// Declared signers without a signature, in declaration order.
    pub fn missing_signers(&self) -> Vec<UserId> {
        self.signers
            .iter()
            .filter(|s| self.signature_of(s).is_none())
            .copied()
            .collect()
    }

    /// `true` iff every declared signer has exactly one signature and every
    /// signature belongs to a declared signer.
    pub fn is_complete(&self) -> bool {
        self.signatures.len() == self.signers.len()
            && self.signers.iter().all(|s| {
                self.signatures.iter().filter(|e| &e.user_id == s).count() == 1
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    fn entry(user: UserId) -> SignatureEntry {
        let kp = Keypair::generate();
        SignatureEntry {
            user_id: user,
            public_key: kp.public_key(),
            signature: kp.sign(b"digest"),
        }
    }

    fn users() -> [UserId; 3] {
        [
            UserId::from_bytes([1; 32]),
            UserId::from_bytes([2; 32]),
            UserId::from_bytes([3; 32]),
        ]
    }

    #[test]
    fn declare_is_idempotent() {
        let mut w = Witness::default();
        let [a, b, _] = users();
        w.declare(a);
        w.declare(b);
        w.declare(a);
        assert_eq!(w.signers(), &[a, b]);
    }

    #[test]
    fn empty_witness_is_complete() {
        assert!(Witness::default().is_complete());
    }

    #[test]
    fn complete_only_when_every_signer_signed() {
        let mut w = Witness::default();
        let [a, b, _] = users();
        w.declare(a);
        w.declare(b);
        assert!(!w.is_complete());
        assert_eq!(w.missing_signers(), vec![a, b]);

        w.attach(entry(b)).unwrap();
        assert!(!w.is_complete());
        assert_eq!(w.missing_signers(), vec![a]);

        w.attach(entry(a)).unwrap();
        assert!(w.is_complete());
        assert!(w.missing_signers().is_empty());
    }

    #[test]
    fn entries_follow_declaration_order() {
        let mut w = Witness::default();
        let [a, b, c] = users();
        w.declare(a);
        w.declare(b);
        w.declare(c);
        w.attach(entry(c)).unwrap();
        w.attach(entry(a)).unwrap();
        w.attach(entry(b)).unwrap();
        let order: Vec<UserId> = w.signatures().iter().map(|e| e.user_id).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn undeclared_signer_rejected() {
        let mut w = Witness::default();
        let [a, b, _] = users();
        w.declare(a);
        assert_eq!(
            w.attach(entry(b)),
            Err(TransactionError::UnknownSigner { user: b })
        );
    }

    #[test]
    fn duplicate_signature_rejected() {
        let mut w = Witness::default();
        let [a, _, _] = users();
        w.declare(a);
        w.attach(entry(a)).unwrap();
        assert_eq!(
            w.attach(entry(a)),
            Err(TransactionError::DuplicateSignature { user: a })
        );
        assert!(w.is_complete());
    }
}
