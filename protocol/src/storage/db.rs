//! # LedgerDb: Local Reference Store
//!
//! A sled-backed [`LedgerTransport`] that keeps transactions on local disk
//! and answers chain queries. The client uses it directly; tests use the
//! temporary variant.
//!
//! ## Tree Layout
//!
//! | Tree           | Key                                      | Value                  |
//! |----------------|------------------------------------------|------------------------|
//! | `transactions` | `tx_id` (32B)                            | wire bytes             |
//! | `chain_index`  | `user_id` (32B) ‖ `asset_group` (32B) ‖ `seq` (8B BE) | `tx_id` (32B) |
//! | `metadata`     | key (UTF-8)                              | `bincode(StoreInfo)`   |
//!
//! `seq` comes from sled's monotonic `generate_id`, stored big-endian so
//! lexicographic order is insertion order. A prefix scan over
//! `user_id ‖ asset_group` walks one user's chain oldest first; the same scan
//! reversed walks it newest first.
//!
//! ## Integrity
//!
//! Inserted bytes are parsed and verified before anything is written. The
//! record, its index entries and the duplicate check run in one sled
//! transaction across `transactions` and `chain_index`, so a failed insert
//! leaves neither tree changed and two concurrent inserts of the same
//! transaction cannot both index it.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult,
    TransactionError as SledTransactionError, Transactional,
};
use sled::{Db, Tree};
use tracing::{debug, warn};

use crate::chain::Direction;
use crate::config::{ID_LENGTH, TRANSACTION_VERSION};
use crate::transaction::{verify_transaction, DeserializeError, Transaction};
use crate::transport::{LedgerTransport, StoreStatus};
use crate::types::{AssetGroupId, TransactionId, UserId};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("stored transaction is corrupt: {0}")]
    Corrupt(#[from] DeserializeError),
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

const META_STORE_INFO: &[u8] = b"store_info";

/// Written once when a store is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Transaction format version the store was created for.
    pub format_version: u16,
    /// Creation time, Unix milliseconds.
    pub created_at_ms: i64,
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent transaction store with per-user chain indexes.
///
/// # Thread Safety
///
/// sled trees support concurrent readers and writers. `LedgerDb` is a set of
/// cheap handles and can be cloned or shared via `Arc<LedgerDb>`.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    /// Wire bytes keyed by transaction id.
    transactions: Tree,
    /// `user ‖ group ‖ seq` -> transaction id.
    chain_index: Tree,
    metadata: Tree,
}

impl LedgerDb {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that lives in a temporary location and is removed on drop.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let transactions = db.open_tree("transactions")?;
        let chain_index = db.open_tree("chain_index")?;
        let metadata = db.open_tree("metadata")?;

        let store = Self {
            db,
            transactions,
            chain_index,
            metadata,
        };
        if store.info()?.is_none() {
            let info = StoreInfo {
                format_version: TRANSACTION_VERSION,
                created_at_ms: Utc::now().timestamp_millis(),
            };
            let bytes =
                bincode::serialize(&info).map_err(|e| DbError::Serialization(e.to_string()))?;
            store.metadata.insert(META_STORE_INFO, bytes)?;
        }
        Ok(store)
    }

    /// The store's creation record.
    pub fn info(&self) -> DbResult<Option<StoreInfo>> {
        match self.metadata.get(META_STORE_INFO)? {
            Some(bytes) => {
                let info: StoreInfo = bincode::deserialize(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    // -- Transaction operations ---------------------------------------------

    /// Verifies and stores a serialized transaction, then indexes it under
    /// every distinct (asset owner, asset group) it carries.
    ///
    /// Returns the stored transaction's id.
    pub fn insert_transaction(&self, bytes: &[u8]) -> Result<TransactionId, StoreStatus> {
        let tx = Transaction::parse(bytes)
            .map_err(|e| StoreStatus::invalid_transaction(e.to_string()))?;
        verify_transaction(&tx).map_err(|e| StoreStatus::invalid_transaction(e.to_string()))?;
        let id = tx
            .id()
            .ok_or_else(|| StoreStatus::invalid_transaction("transaction has no id"))?;

        let owners: BTreeSet<(UserId, AssetGroupId)> = tx
            .relations()
            .iter()
            .flat_map(|r| r.assets())
            .map(|a| (a.user_id(), a.asset_group_id()))
            .collect();

        // Record and index entries commit together or not at all.
        let committed = (&self.transactions, &self.chain_index).transaction(
            |(txs, index)| -> ConflictableTransactionResult<u64, ()> {
                if txs.get(&id.as_bytes()[..])?.is_some() {
                    return Err(ConflictableTransactionError::Abort(()));
                }
                let seq = txs.generate_id()?;
                txs.insert(&id.as_bytes()[..], bytes)?;
                for (user_id, group) in &owners {
                    index.insert(index_key(user_id, group, seq), &id.as_bytes()[..])?;
                }
                Ok(seq)
            },
        );
        let seq = match committed {
            Ok(seq) => seq,
            Err(SledTransactionError::Abort(())) => {
                return Err(StoreStatus::already_exists(format!(
                    "transaction {id} is already stored"
                )))
            }
            Err(SledTransactionError::Storage(e)) => return Err(storage_failure(e)),
        };

        debug!(tx_id = %id, seq, chains = owners.len(), "transaction stored");
        Ok(id)
    }

    /// Retrieve and parse a transaction by id.
    pub fn get_transaction(&self, id: &TransactionId) -> DbResult<Option<Transaction>> {
        match self.transactions.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(Transaction::parse(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Up to `count` serialized transactions of one chain, in `direction`.
    pub fn chain(
        &self,
        user_id: &UserId,
        asset_group_id: &AssetGroupId,
        direction: Direction,
        count: usize,
    ) -> DbResult<Vec<Vec<u8>>> {
        let prefix = chain_prefix(user_id, asset_group_id);
        let scan = self.chain_index.scan_prefix(prefix);
        let entries: Box<dyn Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>> =
            match direction {
                Direction::Ascending => Box::new(scan),
                Direction::Descending => Box::new(scan.rev()),
            };

        let mut out = Vec::new();
        for entry in entries.take(count) {
            let (_key, tx_id) = entry?;
            match self.transactions.get(&tx_id)? {
                Some(bytes) => out.push(bytes.to_vec()),
                None => {
                    warn!(tx_id = %hex::encode(&tx_id), "chain index points at missing transaction");
                    return Err(DbError::Serialization(
                        "chain index points at a missing transaction".to_string(),
                    ));
                }
            }
        }
        Ok(out)
    }

    // -- Utility operations -------------------------------------------------

    /// Return the number of transactions stored.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Block until all pending writes are on disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl LedgerTransport for LedgerDb {
    fn query(
        &self,
        user_id: &UserId,
        asset_group_id: &AssetGroupId,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Vec<u8>>, StoreStatus> {
        self.chain(user_id, asset_group_id, direction, count)
            .map_err(|e| StoreStatus::storage_failure(e.to_string()))
    }

    fn insert(&self, bytes: &[u8]) -> Result<(), StoreStatus> {
        self.insert_transaction(bytes).map(|_| ())
    }
}

fn storage_failure(err: sled::Error) -> StoreStatus {
    StoreStatus::storage_failure(err.to_string())
}

fn chain_prefix(user_id: &UserId, asset_group_id: &AssetGroupId) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_LENGTH * 2 + 8);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(asset_group_id.as_bytes());
    key
}

fn index_key(user_id: &UserId, asset_group_id: &AssetGroupId, seq: u64) -> Vec<u8> {
    let mut key = chain_prefix(user_id, asset_group_id);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
