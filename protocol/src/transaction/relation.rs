//! Relations: an index, the assets it updates, and an optional link back to
//! the transaction it continues.
//!
//! Keeping the index separate from the content lets one transaction carry
//! several independent asset updates, each traceable to its own predecessor.

use super::asset::{Asset, AssetRef};
use super::error::TransactionError;
use crate::types::{AssetGroupId, AssetId, TransactionId, UserId};

/// Link from a relation to a previously finalized transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    /// Identifier of the predecessor transaction.
    pub transaction_id: TransactionId,
    /// Optional specific asset inside the predecessor.
    pub asset_id: Option<AssetId>,
}

/// Zero or more assets plus at most one pointer, under a unique index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    index: u16,
    assets: Vec<Asset>,
    pointer: Option<Pointer>,
}

impl Relation {
    pub(crate) fn new(index: u16) -> Self {
        Self {
            index,
            assets: Vec::new(),
            pointer: None,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    /// `true` if the relation has neither an asset nor a pointer.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.pointer.is_none()
    }

    /// Attaches a new asset with a random nonce and returns where it landed.
    pub fn attach_asset(
        &mut self,
        asset_group_id: AssetGroupId,
        user_id: UserId,
        payload: Vec<u8>,
    ) -> AssetRef {
        self.push_asset(Asset::new(asset_group_id, user_id, payload))
    }

    /// Attaches an already constructed asset.
    pub fn push_asset(&mut self, asset: Asset) -> AssetRef {
        let asset_ref = AssetRef {
            relation_index: self.index,
            position: self.assets.len(),
            asset_id: asset.asset_id(),
        };
        self.assets.push(asset);
        asset_ref
    }

    /// Links this relation to its predecessor.
    ///
    /// # Errors
    ///
    /// [`TransactionError::PointerAlreadySet`] if a pointer is already there.
    pub fn attach_pointer(
        &mut self,
        predecessor: TransactionId,
        predecessor_asset: Option<AssetId>,
    ) -> Result<(), TransactionError> {
        if self.pointer.is_some() {
            return Err(TransactionError::PointerAlreadySet { index: self.index });
        }
        self.pointer = Some(Pointer {
            transaction_id: predecessor,
            asset_id: predecessor_asset,
        });
        Ok(())
    }
}
