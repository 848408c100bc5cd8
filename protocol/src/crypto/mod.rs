//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for witness signatures.
//! - **SHA-256** (`sha2`) for identifiers.
//! - **BLAKE3** (`blake3`) in derive-key mode for the signable digest.
//!
//! Nothing here is hand-rolled.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{domain_separated_hash, double_sha256, sha256, sha256_multi};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use signatures::{sign, verify, verify_checked, SignatureError};
