//! # Ledger Transport
//!
//! The boundary between the transaction core and whatever persists
//! transactions. The core only ever sends serialized transactions and asks
//! for serialized transactions back; sessions, framing and replication are
//! the implementor's business.
//!
//! Calls are blocking round-trips. A store reports outcome with a signed
//! status code; anything below [`SUCCESS_THRESHOLD`] is a failure.

use thiserror::Error;

use crate::chain::Direction;
use crate::config::{
    STATUS_ALREADY_EXISTS, STATUS_INVALID_TRANSACTION, STATUS_STORAGE_FAILURE, SUCCESS_THRESHOLD,
};
use crate::types::{AssetGroupId, UserId};

/// A store's failure status: code plus human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store status {code}: {reason}")]
pub struct StoreStatus {
    pub code: i32,
    pub reason: String,
}

impl StoreStatus {
    pub fn new(code: i32, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Converts a raw status code into a `Result`.
    pub fn check(code: i32, reason: impl Into<String>) -> Result<(), StoreStatus> {
        if code < SUCCESS_THRESHOLD {
            Err(Self::new(code, reason))
        } else {
            Ok(())
        }
    }

    pub fn already_exists(reason: impl Into<String>) -> Self {
        Self::new(STATUS_ALREADY_EXISTS, reason)
    }

    pub fn invalid_transaction(reason: impl Into<String>) -> Self {
        Self::new(STATUS_INVALID_TRANSACTION, reason)
    }

    pub fn storage_failure(reason: impl Into<String>) -> Self {
        Self::new(STATUS_STORAGE_FAILURE, reason)
    }

    pub fn is_already_exists(&self) -> bool {
        self.code == STATUS_ALREADY_EXISTS
    }
}

/// A store the core can query and append to.
///
/// Implementations must be usable from several threads if they are shared;
/// the core itself never shares one.
pub trait LedgerTransport {
    /// Returns up to `count` serialized transactions that carry an asset of
    /// `user_id` in `asset_group_id`, ordered by `direction`.
    fn query(
        &self,
        user_id: &UserId,
        asset_group_id: &AssetGroupId,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Vec<u8>>, StoreStatus>;

    /// Appends one serialized transaction.
    fn insert(&self, bytes: &[u8]) -> Result<(), StoreStatus>;
}

impl<T: LedgerTransport + ?Sized> LedgerTransport for &T {
    fn query(
        &self,
        user_id: &UserId,
        asset_group_id: &AssetGroupId,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Vec<u8>>, StoreStatus> {
        (**self).query(user_id, asset_group_id, direction, count)
    }

    fn insert(&self, bytes: &[u8]) -> Result<(), StoreStatus> {
        (**self).insert(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_codes_are_failures() {
        assert!(StoreStatus::check(0, "ok").is_ok());
        assert!(StoreStatus::check(7, "ok").is_ok());
        let err = StoreStatus::check(-5, "disk full").unwrap_err();
        assert_eq!(err.code, -5);
        assert_eq!(err.reason, "disk full");
        assert_eq!(err.to_string(), "store status -5: disk full");
    }

    #[test]
    fn named_statuses_carry_their_codes() {
        assert!(StoreStatus::already_exists("dup").is_already_exists());
        assert_eq!(
            StoreStatus::invalid_transaction("bad").code,
            STATUS_INVALID_TRANSACTION
        );
        assert_eq!(StoreStatus::storage_failure("io").code, STATUS_STORAGE_FAILURE);
    }
}
