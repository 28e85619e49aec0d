//! Canonical proof payloads.
//!
//! A proof statement's signature covers the JSON encoding of [`ProofPayload`]
//! with fields in declaration order. Anyone holding the identity's public key
//! can recompute the bytes and check ownership without trusting the directory.

use serde::Serialize;
use trackid_types::{Identity, PrivateKey, ProofKey, ProofStatement, PublicKey, UserId};

use crate::hash::sig_id;
use crate::sign::{sign_message, verify_signature, PROOF_DOMAIN};

#[derive(Serialize)]
struct ProofPayload<'a> {
    uid: &'a UserId,
    #[serde(rename = "type")]
    proof_type: &'a str,
    value: &'a str,
    remote: &'a str,
    seqno: u64,
}

/// The canonical bytes signed for one proof statement.
pub fn proof_payload(uid: &UserId, key: &ProofKey, remote: &str, seqno: u64) -> Vec<u8> {
    let payload = ProofPayload {
        uid,
        proof_type: key.proof_type.as_str(),
        value: &key.value,
        remote,
        seqno,
    };
    // A struct of strings and integers always serializes.
    serde_json::to_vec(&payload).unwrap_or_default()
}

/// Create a signed proof statement for `uid`.
pub fn sign_proof(
    uid: &UserId,
    key: ProofKey,
    remote: impl Into<String>,
    seqno: u64,
    private_key: &PrivateKey,
) -> ProofStatement {
    let remote = remote.into();
    let signature = sign_message(
        PROOF_DOMAIN,
        &proof_payload(uid, &key, &remote, seqno),
        private_key,
    );
    ProofStatement {
        sig_id: sig_id(&signature),
        key,
        remote,
        seqno,
        signature,
        revoked: false,
    }
}

/// Check that `statement` was signed by `identity`'s key and that its sig id matches.
pub fn verify_proof(identity: &Identity, statement: &ProofStatement) -> bool {
    verify_proof_with_key(&identity.id, &identity.public_key, statement)
}

/// Like [`verify_proof`], for callers holding the uid and key without the full identity.
pub fn verify_proof_with_key(uid: &UserId, key: &PublicKey, statement: &ProofStatement) -> bool {
    let payload = proof_payload(uid, &statement.key, &statement.remote, statement.seqno);
    statement.sig_id == sig_id(&statement.signature)
        && verify_signature(PROOF_DOMAIN, &payload, &statement.signature, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;
    use trackid_types::{ProofType, Username};

    fn identity(seed: u8) -> (Identity, PrivateKey) {
        let kp = keypair_from_seed(&[seed; 32]);
        let identity = Identity {
            id: UserId::from_public_key(&kp.public),
            username: Username::parse("alice").unwrap(),
            public_key: kp.public,
            proofs: Vec::new(),
        };
        (identity, kp.private)
    }

    #[test]
    fn signed_proof_verifies() {
        let (id, sk) = identity(1);
        let st = sign_proof(
            &id.id,
            ProofKey::new(ProofType::Github, "alice"),
            "https://gist.github.com/alice/1",
            4,
            &sk,
        );
        assert!(verify_proof(&id, &st));
    }

    #[test]
    fn tampered_remote_fails() {
        let (id, sk) = identity(1);
        let mut st = sign_proof(&id.id, ProofKey::new(ProofType::Dns, "a.com"), "a.com", 1, &sk);
        st.remote = "b.com".into();
        assert!(!verify_proof(&id, &st));
    }

    #[test]
    fn other_identity_fails() {
        let (alice, sk) = identity(1);
        let (mallory, _) = identity(2);
        let st = sign_proof(&alice.id, ProofKey::new(ProofType::Pgp, "ab12"), "ab12", 1, &sk);
        assert!(!verify_proof(&mallory, &st));
    }

    #[test]
    fn forged_sig_id_fails() {
        let (id, sk) = identity(3);
        let mut st = sign_proof(&id.id, ProofKey::new(ProofType::Web, "a.com"), "https://a.com", 2, &sk);
        st.sig_id = "00".repeat(32);
        assert!(!verify_proof(&id, &st));
    }

    #[test]
    fn payload_field_order_is_stable() {
        let uid = UserId::parse(&"c".repeat(32)).unwrap();
        let bytes = proof_payload(&uid, &ProofKey::new(ProofType::Twitter, "bob"), "r", 9);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            format!(r#"{{"uid":"{}","type":"twitter","value":"bob","remote":"r","seqno":9}}"#, "c".repeat(32))
        );
    }
}
