//! # Hashing Utilities
//!
//! Two hash functions, each with one job:
//!
//! - **SHA-256** names things. Asset group ids, asset ids, user ids derived
//!   from public keys, and (doubled) transaction identifiers. These values
//!   leave the process and end up in other implementations' indexes, so they
//!   use the hash everybody already has.
//!
//! - **BLAKE3** in `derive_key` mode produces the digest witnesses sign. The
//!   context string keeps it in a different domain from every SHA-256 value
//!   above.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use tessera_protocol::crypto::sha256;
///
/// let hash = sha256(b"tessera");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over several byte slices fed in sequence.
///
/// Equivalent to hashing their concatenation, without building the
/// concatenation.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
///
/// Transaction identifiers use this construction, which shuts out length
/// extension on the canonical encoding.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute a domain-separated hash using BLAKE3 with a context string.
///
/// BLAKE3's `derive_key` mode derives a distinct internal IV from the context,
/// so `domain_separated_hash("a", x)` and `domain_separated_hash("b", x)`
/// cannot collide by construction.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}
