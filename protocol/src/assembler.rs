//! # Transaction Assembler
//!
//! Orchestrates one registration: find the user's latest transaction, build a
//! new one that points at it, sign, finalize and hand it to the store.
//!
//! Query and append are two separate transport calls. Two writers racing on
//! the same predecessor both succeed and fork the chain; resolving forks is
//! left to whoever reads the chain.

use thiserror::Error;
use tracing::{debug, info};

use crate::chain::{fetch_chain, ChainError, ChainQuery, Direction};
use crate::config::LedgerConfig;
use crate::crypto::keys::Keypair;
use crate::keystore::{KeyStore, KeyStoreError};
use crate::transaction::{sign_and_attach, Transaction, TransactionError};
use crate::transport::LedgerTransport;
use crate::types::{TransactionId, UserId};

/// Relation index used for the single relation an assembled transaction has.
pub const PRIMARY_RELATION: u16 = 0;

/// Errors from the registration workflow.
#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

/// Builds chain-linked, signed transactions for one asset group.
#[derive(Debug, Clone, Default)]
pub struct TransactionAssembler {
    config: LedgerConfig,
}

impl TransactionAssembler {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Builds, signs and finalizes a single-relation transaction.
    ///
    /// Relation 0 gets one asset with `payload` owned by `user_id` and, when
    /// `predecessor` is given, a pointer to it. `user_id` is the only declared
    /// witness.
    pub fn assemble_and_sign(
        &self,
        user_id: UserId,
        predecessor: Option<TransactionId>,
        payload: Vec<u8>,
        keypair: &Keypair,
    ) -> Result<Transaction, TransactionError> {
        let mut tx = Transaction::new();
        let relation = tx.new_relation(PRIMARY_RELATION)?;
        relation.attach_asset(self.config.asset_group_id, user_id, payload);
        if let Some(prev) = predecessor {
            relation.attach_pointer(prev, None)?;
        }
        tx.declare_witness(user_id)?;
        sign_and_attach(&mut tx, user_id, keypair)?;
        tx.finalize(self.config.witness_required)?;
        Ok(tx)
    }

    /// The user's most recent transaction in this asset group, if any.
    ///
    /// Fetches the newest `chain_query_limit` elements, latest first, so every
    /// element in the window is verified and the head is the predecessor.
    pub fn latest_predecessor<T: LedgerTransport + ?Sized>(
        &self,
        transport: &T,
        user_id: UserId,
    ) -> Result<Option<TransactionId>, ChainError> {
        let query = ChainQuery::latest(
            user_id,
            self.config.asset_group_id,
            self.config.chain_query_limit,
        )
        .with_direction(Direction::Descending);
        let chain = fetch_chain(transport, &query)?;
        Ok(chain.first().and_then(Transaction::id))
    }

    /// Runs the full workflow and returns the stored transaction.
    ///
    /// # Errors
    ///
    /// - [`AssemblerError::KeyStore`] if the user's key is unavailable.
    /// - [`AssemblerError::Chain`] with [`ChainError::QueryFailed`],
    ///   [`ChainError::VerificationFailed`] or [`ChainError::InsertFailed`].
    /// - [`AssemblerError::Transaction`] if construction fails.
    pub fn register<T, K>(
        &self,
        transport: &T,
        keystore: &K,
        user_id: UserId,
        payload: Vec<u8>,
    ) -> Result<Transaction, AssemblerError>
    where
        T: LedgerTransport + ?Sized,
        K: KeyStore + ?Sized,
    {
        let keypair = keystore.get_keypair(&user_id)?;
        let predecessor = self.latest_predecessor(transport, user_id)?;
        debug!(user = %user_id, predecessor = ?predecessor, "predecessor resolved");

        let tx = self.assemble_and_sign(user_id, predecessor, payload, &keypair)?;
        let bytes = tx.serialize()?;
        transport
            .insert(&bytes)
            .map_err(|status| ChainError::InsertFailed(status.to_string()))?;

        if let Some(id) = tx.id() {
            info!(
                tx_id = %id,
                user = %user_id,
                chained = predecessor.is_some(),
                bytes = bytes.len(),
                "transaction registered"
            );
        }
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::MemoryKeyStore;
    use crate::transaction::verify_transaction;
    use crate::transport::StoreStatus;
    use crate::types::AssetGroupId;
    use parking_lot::Mutex;

    /// Append-only in-memory store, newest last.
    #[derive(Default)]
    struct VecStore {
        items: Mutex<Vec<Vec<u8>>>,
        reject_inserts: bool,
    }

    impl LedgerTransport for VecStore {
        fn query(
            &self,
            _user_id: &UserId,
            _asset_group_id: &AssetGroupId,
            direction: Direction,
            count: usize,
        ) -> Result<Vec<Vec<u8>>, StoreStatus> {
            let items = self.items.lock();
            let out: Vec<Vec<u8>> = match direction {
                Direction::Ascending => items.iter().take(count).cloned().collect(),
                Direction::Descending => items.iter().rev().take(count).cloned().collect(),
            };
            Ok(out)
        }

        fn insert(&self, bytes: &[u8]) -> Result<(), StoreStatus> {
            if self.reject_inserts {
                return Err(StoreStatus::storage_failure("read-only"));
            }
            self.items.lock().push(bytes.to_vec());
            Ok(())
        }
    }

    fn identity(keys: &MemoryKeyStore) -> UserId {
        let kp = Keypair::generate();
        let user = UserId::from_public_key(&kp.public_key());
        keys.insert(user, kp);
        user
    }

    #[test]
    fn assembled_transaction_is_valid() {
        let assembler = TransactionAssembler::new(LedgerConfig::for_group("a"));
        let kp = Keypair::generate();
        let user = UserId::from_public_key(&kp.public_key());
        let tx = assembler
            .assemble_and_sign(user, None, b"payload".to_vec(), &kp)
            .unwrap();

        assert!(tx.is_sealed());
        assert!(verify_transaction(&tx).is_ok());
        let relation = tx.relation(PRIMARY_RELATION).unwrap();
        assert!(relation.pointer().is_none());
        assert_eq!(relation.assets()[0].body(), b"payload");
        assert_eq!(
            relation.assets()[0].asset_group_id(),
            AssetGroupId::from_name("a")
        );
    }

    #[test]
    fn register_chains_to_previous() {
        let store = VecStore::default();
        let keys = MemoryKeyStore::new();
        let user = identity(&keys);
        let assembler = TransactionAssembler::default();

        let first = assembler.register(&store, &keys, user, b"1".to_vec()).unwrap();
        let second = assembler.register(&store, &keys, user, b"2".to_vec()).unwrap();

        assert!(first.relation(0).unwrap().pointer().is_none());
        let pointer = second.relation(0).unwrap().pointer().unwrap();
        assert_eq!(Some(pointer.transaction_id), first.id());
    }

    #[test]
    fn chain_longer_than_query_limit_stays_linear() {
        let store = VecStore::default();
        let keys = MemoryKeyStore::new();
        let user = identity(&keys);
        let config = LedgerConfig {
            chain_query_limit: 2,
            ..LedgerConfig::default()
        };
        let assembler = TransactionAssembler::new(config);

        let mut previous: Option<TransactionId> = None;
        for n in 0..5u8 {
            let tx = assembler.register(&store, &keys, user, vec![n]).unwrap();
            let pointer = tx.relation(0).unwrap().pointer().map(|p| p.transaction_id);
            assert_eq!(pointer, previous, "registration {n} linked to a stale predecessor");
            previous = tx.id();
        }
        assert_eq!(assembler.latest_predecessor(&store, user).unwrap(), previous);
    }

    #[test]
    fn missing_key_fails_before_any_store_call() {
        let store = VecStore::default();
        let keys = MemoryKeyStore::new();
        let err = TransactionAssembler::default()
            .register(&store, &keys, UserId::from_bytes([3; 32]), Vec::new())
            .unwrap_err();
        assert!(matches!(err, AssemblerError::KeyStore(KeyStoreError::NotFound(_))));
        assert!(store.items.lock().is_empty());
    }

    #[test]
    fn rejected_insert_is_insert_failed() {
        let store = VecStore {
            reject_inserts: true,
            ..VecStore::default()
        };
        let keys = MemoryKeyStore::new();
        let user = identity(&keys);
        let err = TransactionAssembler::default()
            .register(&store, &keys, user, b"x".to_vec())
            .unwrap_err();
        assert!(matches!(
            err,
            AssemblerError::Chain(ChainError::InsertFailed(reason)) if reason.contains("read-only")
        ));
    }
}
