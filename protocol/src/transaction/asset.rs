//! Assets: opaque user payloads with provenance.
//!
//! The ledger never looks inside `body`. Callers encode their own records
//! (JSON, bincode, whatever) and hand over the bytes.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::NONCE_LENGTH;
use crate::crypto::hash::sha256_multi;
use crate::types::{AssetGroupId, AssetId, UserId};

/// A payload owned by one user inside one asset group.
///
/// Fields are read-only once constructed; a relation never hands out
/// mutable access to its assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    asset_id: AssetId,
    asset_group_id: AssetGroupId,
    user_id: UserId,
    nonce: [u8; NONCE_LENGTH],
    body: Vec<u8>,
}

impl Asset {
    /// Creates an asset with a fresh random nonce.
    pub fn new(asset_group_id: AssetGroupId, user_id: UserId, body: Vec<u8>) -> Self {
        let mut nonce = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);
        Self::with_nonce(asset_group_id, user_id, nonce, body)
    }

    /// Creates an asset with a caller-chosen nonce. Two calls with equal
    /// arguments produce equal assets.
    pub fn with_nonce(
        asset_group_id: AssetGroupId,
        user_id: UserId,
        nonce: [u8; NONCE_LENGTH],
        body: Vec<u8>,
    ) -> Self {
        let asset_id = Self::derive_id(&asset_group_id, &user_id, &nonce, &body);
        Self {
            asset_id,
            asset_group_id,
            user_id,
            nonce,
            body,
        }
    }

    /// `SHA-256(asset_group_id ‖ user_id ‖ nonce ‖ len_le32(body) ‖ body)`.
    pub fn derive_id(
        asset_group_id: &AssetGroupId,
        user_id: &UserId,
        nonce: &[u8; NONCE_LENGTH],
        body: &[u8],
    ) -> AssetId {
        let len = (body.len() as u32).to_le_bytes();
        AssetId::from_bytes(sha256_multi(&[
            asset_group_id.as_bytes(),
            user_id.as_bytes(),
            nonce,
            &len,
            body,
        ]))
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn asset_group_id(&self) -> AssetGroupId {
        self.asset_group_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn nonce(&self) -> &[u8; NONCE_LENGTH] {
        &self.nonce
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether `asset_id` matches the content. Always true for assets built
    /// here; parsed assets are checked with this.
    pub fn id_is_consistent(&self) -> bool {
        Self::derive_id(&self.asset_group_id, &self.user_id, &self.nonce, &self.body)
            == self.asset_id
    }

    /// Rebuilds an asset from wire fields without recomputing the id.
    pub(crate) fn from_parts(
        asset_id: AssetId,
        asset_group_id: AssetGroupId,
        user_id: UserId,
        nonce: [u8; NONCE_LENGTH],
        body: Vec<u8>,
    ) -> Self {
        Self {
            asset_id,
            asset_group_id,
            user_id,
            nonce,
            body,
        }
    }
}

/// Where an attached asset landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRef {
    /// Index of the relation holding the asset.
    pub relation_index: u16,
    /// Position of the asset inside that relation.
    pub position: usize,
    /// Content-derived id, usable as a pointer's asset reference.
    pub asset_id: AssetId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> AssetGroupId {
        AssetGroupId::from_name("test_asset_group")
    }

    #[test]
    fn same_inputs_same_id() {
        let user = UserId::from_bytes([1; 32]);
        let a = Asset::with_nonce(group(), user, [9; 32], b"payload".to_vec());
        let b = Asset::with_nonce(group(), user, [9; 32], b"payload".to_vec());
        assert_eq!(a, b);
        assert!(a.id_is_consistent());
    }

    #[test]
    fn random_nonce_distinguishes_identical_payloads() {
        let user = UserId::from_bytes([1; 32]);
        let a = Asset::new(group(), user, b"payload".to_vec());
        let b = Asset::new(group(), user, b"payload".to_vec());
        assert_ne!(a.asset_id(), b.asset_id());
    }

    #[test]
    fn id_covers_every_field() {
        let user = UserId::from_bytes([1; 32]);
        let base = Asset::with_nonce(group(), user, [0; 32], b"x".to_vec());
        let other_user = Asset::with_nonce(group(), UserId::from_bytes([2; 32]), [0; 32], b"x".to_vec());
        let other_group = Asset::with_nonce(AssetGroupId::from_name("g2"), user, [0; 32], b"x".to_vec());
        let other_body = Asset::with_nonce(group(), user, [0; 32], b"y".to_vec());
        assert_ne!(base.asset_id(), other_user.asset_id());
        assert_ne!(base.asset_id(), other_group.asset_id());
        assert_ne!(base.asset_id(), other_body.asset_id());
    }

    #[test]
    fn tampered_parts_are_detected() {
        let user = UserId::from_bytes([1; 32]);
        let good = Asset::with_nonce(group(), user, [0; 32], b"x".to_vec());
        let forged = Asset::from_parts(good.asset_id(), group(), user, [0; 32], b"z".to_vec());
        assert!(!forged.id_is_consistent());
    }

    #[test]
    fn empty_body_is_allowed() {
        let asset = Asset::new(group(), UserId::from_bytes([3; 32]), Vec::new());
        assert!(asset.body().is_empty());
        assert!(asset.id_is_consistent());
    }
}
