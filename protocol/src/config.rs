//! # Protocol Configuration & Constants
//!
//! Every magic number in Tessera lives here, next to [`LedgerConfig`], the
//! explicitly constructed configuration value handed to the assembler.
//!
//! Changing a wire or digest constant changes every transaction identifier
//! computed afterwards. Bump [`TRANSACTION_VERSION`] when you do.

use crate::types::AssetGroupId;

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every serialized transaction. Lets a parser
/// reject foreign input before reading any length prefix.
pub const WIRE_MAGIC: [u8; 4] = *b"TSRA";

/// Transaction format version written into every transaction header.
pub const TRANSACTION_VERSION: u16 = 1;

/// The crate version string, for client banners and logs.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Length of every identifier (transaction, user, asset group, asset).
pub const ID_LENGTH: usize = 32;

/// Length of an asset nonce.
pub const NONCE_LENGTH: usize = 32;

/// Ed25519 public key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 secret key length.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// BLAKE3 `derive_key` context for the digest every witness signs.
///
/// Keeping it distinct from the identifier hash means a signature can never
/// be replayed as a signature over some transaction identifier.
pub const SIGNABLE_DIGEST_CONTEXT: &str = "tessera 2026-01 signable transaction v1";

// ---------------------------------------------------------------------------
// Chain Queries
// ---------------------------------------------------------------------------

/// How many prior transactions a chain query asks for when the caller does
/// not say otherwise.
pub const DEFAULT_CHAIN_QUERY_LIMIT: usize = 30;

// ---------------------------------------------------------------------------
// Store Status Codes
// ---------------------------------------------------------------------------

/// Status codes below this value mean the store rejected the request.
pub const SUCCESS_THRESHOLD: i32 = 0;

/// The request succeeded.
pub const STATUS_SUCCESS: i32 = 0;

/// A transaction with the same identifier is already stored.
pub const STATUS_ALREADY_EXISTS: i32 = -1;

/// The submitted bytes did not parse or did not verify.
pub const STATUS_INVALID_TRANSACTION: i32 = -2;

/// The store itself failed (I/O, corruption).
pub const STATUS_STORAGE_FAILURE: i32 = -3;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Per-dataset settings passed into the assembler.
///
/// Nothing here is process-global: two assemblers with different asset
/// groups can run side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Asset group every assembled asset belongs to.
    pub asset_group_id: AssetGroupId,

    /// When `true`, `finalize` refuses transactions whose witness is not
    /// complete.
    pub witness_required: bool,

    /// Maximum number of prior transactions fetched when looking for a
    /// predecessor.
    pub chain_query_limit: usize,
}

impl LedgerConfig {
    /// Configuration for the asset group derived from a human-readable name.
    pub fn for_group(name: &str) -> Self {
        Self {
            asset_group_id: AssetGroupId::from_name(name),
            ..Self::default()
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            asset_group_id: AssetGroupId::from_name("default"),
            witness_required: true,
            chain_query_limit: DEFAULT_CHAIN_QUERY_LIMIT,
        }
    }
}
