//! # Digital Signatures
//!
//! Ed25519 signing and verification for witness entries.
//!
//! Every signature a witness attaches goes through [`sign`], and every check
//! a verifier runs goes through [`verify_checked`]. One place to audit.

use thiserror::Error;

use super::keys::{Keypair, PublicKey, Signature};

/// Errors during signature verification.
///
/// Intentionally vague about the cause.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("public key is not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// Sign a message with a keypair.
///
/// # Example
///
/// ```
/// use tessera_protocol::crypto::{Keypair, sign, verify};
///
/// let keypair = Keypair::generate();
/// let signature = sign(&keypair, b"digest");
/// assert!(verify(&keypair.public_key(), b"digest", &signature));
/// ```
pub fn sign(keypair: &Keypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Verify a signature, returning a plain yes/no.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify a signature, distinguishing malformed keys from bad signatures.
pub fn verify_checked(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), SignatureError> {
    if !public_key.is_curve_point() {
        return Err(SignatureError::InvalidPublicKey);
    }
    if public_key.verify(message, signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"hello, world");
        assert!(verify(&kp.public_key(), b"hello, world", &sig));
        assert!(verify_checked(&kp.public_key(), b"hello, world", &sig).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"correct message");
        assert!(matches!(
            verify_checked(&kp.public_key(), b"wrong message", &sig),
            Err(SignatureError::VerificationFailed)
        ));
    }

    #[test]
    fn test_deterministic_signatures() {
        let kp = Keypair::generate();
        let sig1 = sign(&kp, b"determinism is underrated");
        let sig2 = sign(&kp, b"determinism is underrated");
        assert_eq!(sig1.as_bytes(), sig2.as_bytes());
    }

    #[test]
    fn test_invalid_public_key_fails() {
        // A small-order point: decodes, but strict verification refuses it.
        let weak_pk = PublicKey::from_bytes([0u8; 32]);
        let sig = Signature::from_bytes([0u8; 64]);
        assert!(matches!(
            verify_checked(&weak_pk, b"doesn't matter", &sig),
            Err(SignatureError::VerificationFailed)
        ));

        // y = 2 has no matching x on the curve.
        let mut off_curve = [0u8; 32];
        off_curve[0] = 2;
        assert!(matches!(
            verify_checked(&PublicKey::from_bytes(off_curve), b"x", &sig),
            Err(SignatureError::InvalidPublicKey)
        ));
    }
}
