//! Fixed-width identifiers.
//!
//! Every identifier in the ledger is 32 bytes. They are distinct types so a
//! user id can never be passed where a transaction id is expected, but they
//! share one shape: raw bytes inside, lowercase hex outside (Display, Debug,
//! serde).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::ID_LENGTH;
use crate::crypto::hash::sha256;
use crate::crypto::keys::PublicKey;

/// Error parsing an identifier from hex.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; ID_LENGTH]);

        impl $name {
            /// Wrap raw identifier bytes.
            pub const fn from_bytes(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Parse from a byte slice of exactly 32 bytes.
            pub fn from_slice(slice: &[u8]) -> Result<Self, IdParseError> {
                let bytes: [u8; ID_LENGTH] = slice
                    .try_into()
                    .map_err(|_| IdParseError::WrongLength(slice.len()))?;
                Ok(Self(bytes))
            }

            /// Parse from lowercase or uppercase hex.
            pub fn from_hex(s: &str) -> Result<Self, IdParseError> {
                let bytes =
                    hex::decode(s.trim()).map_err(|e| IdParseError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }

            /// The raw identifier bytes.
            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }

            /// Lowercase hex, 64 characters.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..16])
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_id!(
    /// Content-derived name of a finalized transaction.
    TransactionId
);

define_id!(
    /// Identity of a ledger user. Owns assets, declares witnesses.
    UserId
);

define_id!(
    /// Logical dataset an asset belongs to. Derived from a group name.
    AssetGroupId
);

define_id!(
    /// Content-derived name of a single asset inside a relation.
    AssetId
);

impl AssetGroupId {
    /// `SHA-256(name)`. The same name always maps to the same group.
    pub fn from_name(name: &str) -> Self {
        Self(sha256(name.as_bytes()))
    }
}

impl UserId {
    /// `SHA-256(public_key)`. Used by the client when minting a fresh
    /// identity; the ledger itself treats user ids as opaque.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(sha256(public_key.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    #[test]
    fn hex_roundtrip() {
        let id = TransactionId::from_bytes([0xAB; 32]);
        assert_eq!(id.to_hex().len(), 64);
        assert_eq!(TransactionId::from_hex(&id.to_hex()).unwrap(), id);
        assert_eq!(id.to_string().parse::<TransactionId>().unwrap(), id);
    }

    #[test]
    fn wrong_length_rejected() {
        assert_eq!(
            UserId::from_hex("deadbeef"),
            Err(IdParseError::WrongLength(4))
        );
        assert!(matches!(
            UserId::from_hex("zz"),
            Err(IdParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn asset_group_from_name_is_stable() {
        let a = AssetGroupId::from_name("test_asset_group");
        let b = AssetGroupId::from_name("test_asset_group");
        assert_eq!(a, b);
        assert_ne!(a, AssetGroupId::from_name("other_group"));
    }

    #[test]
    fn user_id_from_public_key() {
        let kp = Keypair::generate();
        let id = UserId::from_public_key(&kp.public_key());
        assert_eq!(id, UserId::from_public_key(&kp.public_key()));
        assert_eq!(id.as_bytes(), &sha256(kp.public_key().as_bytes()));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let id = UserId::from_bytes([1u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let recovered: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, id);
    }

    #[test]
    fn debug_is_abbreviated() {
        let id = AssetId::from_bytes([0xCD; 32]);
        assert_eq!(format!("{:?}", id), "AssetId(cdcdcdcdcdcdcdcd)");
    }
}
