//! # On-Disk Identity
//!
//! The user's ID file and a file-backed [`KeyStore`].
//!
//! ## Layout
//!
//! ```text
//! <id-file>                          {"id": "<user id hex>"}
//! <data-dir>/keys/<user>.private_key hex secret key, mode 0600 on Unix
//! <data-dir>/keys/<user>.public_key  hex public key
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tessera_protocol::crypto::{KeyError, Keypair};
use tessera_protocol::keystore::{KeyStore, KeyStoreError};
use tessera_protocol::types::UserId;

const PRIVATE_KEY_EXT: &str = "private_key";
const PUBLIC_KEY_EXT: &str = "public_key";

/// Contents of the ID file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFile {
    /// The user id, hex encoded.
    pub id: UserId,
}

impl IdFile {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read ID file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("ID file {} is not valid JSON with an \"id\" field", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write ID file {}", path.display()))
    }
}

/// Keys stored as hex files under one directory, one pair per user.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    dir: PathBuf,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, user_id: &UserId, ext: &str) -> PathBuf {
        self.dir.join(format!("{}.{ext}", user_id.to_hex()))
    }

    /// Writes both halves of `keypair` for `user_id`.
    pub fn store(&self, user_id: &UserId, keypair: &Keypair) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create key directory {}", self.dir.display()))?;

        let private_path = self.key_path(user_id, PRIVATE_KEY_EXT);
        fs::write(&private_path, hex::encode(keypair.secret_key_bytes()))
            .with_context(|| format!("failed to write {}", private_path.display()))?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&private_path, fs::Permissions::from_mode(0o600))?;
        }

        let public_path = self.key_path(user_id, PUBLIC_KEY_EXT);
        fs::write(&public_path, keypair.public_key().to_hex())
            .with_context(|| format!("failed to write {}", public_path.display()))?;
        Ok(())
    }

    fn read_hex(&self, user_id: &UserId, ext: &str) -> Result<Vec<u8>, KeyStoreError> {
        let path = self.key_path(user_id, ext);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeyStoreError::NotFound(*user_id))
            }
            Err(e) => return Err(e.into()),
        };
        hex::decode(raw.trim()).map_err(|_| KeyStoreError::InvalidKey {
            user: *user_id,
            source: if ext == PRIVATE_KEY_EXT {
                KeyError::InvalidSecretKey
            } else {
                KeyError::InvalidPublicKey
            },
        })
    }
}

impl KeyStore for FileKeyStore {
    fn get_keypair(&self, user_id: &UserId) -> Result<Keypair, KeyStoreError> {
        let secret = self.read_hex(user_id, PRIVATE_KEY_EXT)?;
        let public = self.read_hex(user_id, PUBLIC_KEY_EXT)?;
        Keypair::from_parts(&secret, &public).map_err(|source| KeyStoreError::InvalidKey {
            user: *user_id,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ID_FILE");
        let id_file = IdFile {
            id: UserId::from_bytes([0xAB; 32]),
        };
        id_file.write(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(&"ab".repeat(32)));
        assert_eq!(IdFile::read(&path).unwrap(), id_file);
    }

    #[test]
    fn stored_keys_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("keys"));
        let keypair = Keypair::generate();
        let user = UserId::from_public_key(&keypair.public_key());
        store.store(&user, &keypair).unwrap();

        let loaded = store.get_keypair(&user).unwrap();
        assert_eq!(loaded.public_key(), keypair.public_key());
    }

    #[test]
    fn missing_keys_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path());
        let user = UserId::from_bytes([1; 32]);
        assert!(matches!(
            store.get_keypair(&user),
            Err(KeyStoreError::NotFound(u)) if u == user
        ));
    }

    #[test]
    fn mismatched_halves_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path());
        let a = Keypair::generate();
        let user = UserId::from_public_key(&a.public_key());
        store.store(&user, &a).unwrap();
        fs::write(
            dir.path().join(format!("{}.public_key", user.to_hex())),
            Keypair::generate().public_key().to_hex(),
        )
        .unwrap();

        assert!(matches!(
            store.get_keypair(&user),
            Err(KeyStoreError::InvalidKey {
                source: KeyError::KeypairMismatch,
                ..
            })
        ));
    }
}
