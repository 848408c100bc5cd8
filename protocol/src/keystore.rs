//! Key lookup for witnesses.
//!
//! The assembler never loads keys itself. It asks a [`KeyStore`] for the
//! acting user's keypair; where that keypair comes from (files, an HSM, a
//! test fixture) is the store's concern.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use crate::crypto::keys::{KeyError, Keypair};
use crate::types::UserId;

/// Errors from key lookup.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("no key for user {0}")]
    NotFound(UserId),

    #[error("key material for user {user} is invalid: {source}")]
    InvalidKey {
        user: UserId,
        #[source]
        source: KeyError,
    },

    #[error("key store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of witness keypairs.
pub trait KeyStore {
    fn get_keypair(&self, user_id: &UserId) -> Result<Keypair, KeyStoreError>;
}

impl<K: KeyStore + ?Sized> KeyStore for &K {
    fn get_keypair(&self, user_id: &UserId) -> Result<Keypair, KeyStoreError> {
        (**self).get_keypair(user_id)
    }
}

/// In-process key store. Thread-safe.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<UserId, Keypair>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `keypair` for `user_id`, replacing any previous key.
    pub fn insert(&self, user_id: UserId, keypair: Keypair) {
        self.keys.write().insert(user_id, keypair);
    }

    /// Stores raw key halves after checking they belong together.
    pub fn insert_parts(
        &self,
        user_id: UserId,
        secret: &[u8],
        public: &[u8],
    ) -> Result<(), KeyStoreError> {
        let keypair = Keypair::from_parts(secret, public).map_err(|source| {
            KeyStoreError::InvalidKey {
                user: user_id,
                source,
            }
        })?;
        self.insert(user_id, keypair);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn get_keypair(&self, user_id: &UserId) -> Result<Keypair, KeyStoreError> {
        self.keys
            .read()
            .get(user_id)
            .cloned()
            .ok_or(KeyStoreError::NotFound(*user_id))
    }
}
