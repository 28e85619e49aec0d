//! Domain-separated Ed25519 signing and verification.
//!
//! Every signed message is prefixed with a domain tag and a NUL byte, so a
//! signature over a proof payload can never be replayed as a tracking statement.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use trackid_types::{PrivateKey, PublicKey, Signature};

/// Domain tag for proof statements in an identity's proof table.
pub const PROOF_DOMAIN: &[u8] = b"trackid-proof-v1";

/// Domain tag for tracking statements.
pub const TRACK_DOMAIN: &[u8] = b"trackid-track-v1";

fn framed(domain: &[u8], message: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(domain.len() + 1 + message.len());
    buf.extend_from_slice(domain);
    buf.push(0);
    buf.extend_from_slice(message);
    buf
}

/// Sign `message` under `domain` with a private key.
pub fn sign_message(domain: &[u8], message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(&framed(domain, message));
    Signature(sig.to_bytes())
}

/// Verify a signature made by [`sign_message`] under the same domain.
///
/// Uses strict verification, which rejects non-canonical signatures and
/// weak public keys.
pub fn verify_signature(
    domain: &[u8],
    message: &[u8],
    signature: &Signature,
    public_key: &PublicKey,
) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify_strict(&framed(domain, message), &dalek_sig)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn sign_and_verify() {
        let kp = generate_keypair().unwrap();
        let sig = sign_message(TRACK_DOMAIN, b"statement", &kp.private);
        assert!(verify_signature(TRACK_DOMAIN, b"statement", &sig, &kp.public));
    }

    #[test]
    fn domain_mismatch_fails() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let sig = sign_message(PROOF_DOMAIN, b"payload", &kp.private);
        assert!(!verify_signature(TRACK_DOMAIN, b"payload", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(TRACK_DOMAIN, b"m", &kp1.private);
        assert!(!verify_signature(TRACK_DOMAIN, b"m", &sig, &kp2.public));
    }

    #[test]
    fn ed25519_signatures_are_deterministic() {
        let kp = keypair_from_seed(&[99u8; 32]);
        let a = sign_message(TRACK_DOMAIN, b"same", &kp.private);
        let b = sign_message(TRACK_DOMAIN, b"same", &kp.private);
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_public_key() {
        let kp = keypair_from_seed(&[5u8; 32]);
        let sig = sign_message(TRACK_DOMAIN, b"test", &kp.private);
        assert!(!verify_signature(TRACK_DOMAIN, b"test", &sig, &PublicKey([0xFF; 32])));
    }
}
