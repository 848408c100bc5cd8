//! # Chain Query Protocol
//!
//! Retrieves a user's prior transactions in a guaranteed order so a new one
//! can be linked to the latest. Every element coming back from the store is
//! parsed and re-verified here; an element that fails is an error, never a
//! silently skipped entry, and can never be picked as a predecessor.
//!
//! An empty result is not an error. It means the next transaction is the
//! first in its chain.

use thiserror::Error;
use tracing::{debug, warn};

use crate::transaction::{verify_transaction, DeserializeError, Transaction, TransactionError};
use crate::transport::LedgerTransport;
use crate::types::{AssetGroupId, TransactionId, UserId};

/// Order of a chain query, by store insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Newest first. Element 0 is the latest transaction.
    #[default]
    Descending,
    /// Oldest first.
    Ascending,
}

impl Direction {
    /// Numeric form used by stores: `0` descending, `1` ascending.
    pub fn as_wire(self) -> u8 {
        match self {
            Direction::Descending => 0,
            Direction::Ascending => 1,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Direction::Descending),
            1 => Some(Direction::Ascending),
            _ => None,
        }
    }
}

/// Errors from chain queries and appends.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The store rejected or failed the query.
    #[error("chain query failed: {0}")]
    QueryFailed(String),

    /// The store rejected or failed the insert.
    #[error("insert failed: {0}")]
    InsertFailed(String),

    /// A returned element is not a well-formed transaction.
    #[error("chain element {position} is malformed: {source}")]
    Deserialize {
        position: usize,
        #[source]
        source: DeserializeError,
    },

    /// A returned element parsed but failed verification.
    #[error("chain element {position} failed verification: {source}")]
    VerificationFailed {
        position: usize,
        #[source]
        source: TransactionError,
    },

    /// A returned element is valid but carries no asset of the queried user
    /// in the queried asset group.
    #[error("chain element {position} does not belong to the queried chain")]
    ForeignElement { position: usize },
}

/// What to ask the store for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainQuery {
    pub user_id: UserId,
    pub asset_group_id: AssetGroupId,
    pub limit: usize,
    pub direction: Direction,
}

impl ChainQuery {
    /// A descending query for the most recent `limit` transactions.
    pub fn latest(user_id: UserId, asset_group_id: AssetGroupId, limit: usize) -> Self {
        Self {
            user_id,
            asset_group_id,
            limit,
            direction: Direction::Descending,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Fetches, parses and verifies a user's chain in the requested order.
///
/// # Errors
///
/// - [`ChainError::QueryFailed`] if the transport fails.
/// - [`ChainError::Deserialize`] or [`ChainError::VerificationFailed`] if any
///   element is not a valid transaction.
/// - [`ChainError::ForeignElement`] if a valid element belongs to some other
///   user or asset group.
pub fn fetch_chain<T: LedgerTransport + ?Sized>(
    transport: &T,
    query: &ChainQuery,
) -> Result<Vec<Transaction>, ChainError> {
    let raw = transport
        .query(
            &query.user_id,
            &query.asset_group_id,
            query.direction,
            query.limit,
        )
        .map_err(|status| ChainError::QueryFailed(status.to_string()))?;

    let mut chain = Vec::with_capacity(raw.len());
    for (position, bytes) in raw.iter().enumerate() {
        let tx = Transaction::parse(bytes)
            .map_err(|source| ChainError::Deserialize { position, source })?;
        verify_transaction(&tx).map_err(|source| {
            warn!(position, error = %source, "chain element failed verification");
            ChainError::VerificationFailed { position, source }
        })?;
        if !belongs_to(&tx, &query.user_id, &query.asset_group_id) {
            warn!(position, tx_id = ?tx.id(), "chain element from another chain");
            return Err(ChainError::ForeignElement { position });
        }
        chain.push(tx);
    }

    debug!(
        user = %query.user_id,
        direction = ?query.direction,
        returned = chain.len(),
        "chain fetched"
    );
    Ok(chain)
}

fn belongs_to(tx: &Transaction, user_id: &UserId, asset_group_id: &AssetGroupId) -> bool {
    tx.relations()
        .iter()
        .flat_map(|r| r.assets())
        .any(|a| a.user_id() == *user_id && a.asset_group_id() == *asset_group_id)
}

/// Identifier of the user's most recent transaction, or `None` when the user
/// has no chain yet.
pub fn latest_predecessor<T: LedgerTransport + ?Sized>(
    transport: &T,
    user_id: UserId,
    asset_group_id: AssetGroupId,
) -> Result<Option<TransactionId>, ChainError> {
    let query = ChainQuery::latest(user_id, asset_group_id, 1);
    let chain = fetch_chain(transport, &query)?;
    Ok(chain.first().and_then(Transaction::id))
}
