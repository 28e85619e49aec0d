//! The identity record loaded by the resolution layer.

use serde::{Deserialize, Serialize};

use crate::keys::{PublicKey, Signature};
use crate::proof::ProofKey;
use crate::user::{UserId, Username};

/// One public proof statement from an identity's proof table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStatement {
    /// What is being claimed.
    pub key: ProofKey,
    /// Where the evidence lives (a post URL, a domain, a key fingerprint).
    pub remote: String,
    /// Position of the statement in the owner's chain; later statements supersede earlier ones.
    pub seqno: u64,
    /// Hex Blake2b-256 of `signature`; this is what remote evidence must contain.
    pub sig_id: String,
    /// The owner's signature over the canonical proof payload.
    pub signature: Signature,
    /// Set when the owner has explicitly revoked this statement.
    #[serde(default)]
    pub revoked: bool,
}

/// A user identity: a stable id plus the public key and proof table current at load time.
///
/// The id never changes. Everything else is a snapshot; one identify run reads it
/// without modifying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: Username,
    pub public_key: PublicKey,
    #[serde(default)]
    pub proofs: Vec<ProofStatement>,
}

impl Identity {
    /// Whether this identity denotes the same account as `other`.
    pub fn same_user(&self, other: &Identity) -> bool {
        self.id == other.id
    }

    /// The non-revoked statement with the highest seqno for `key`, if any.
    pub fn latest_proof(&self, key: &ProofKey) -> Option<&ProofStatement> {
        self.proofs
            .iter()
            .filter(|p| &p.key == key && !p.revoked)
            .max_by_key(|p| p.seqno)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::ProofType;

    fn statement(value: &str, seqno: u64, revoked: bool) -> ProofStatement {
        ProofStatement {
            key: ProofKey::new(ProofType::Twitter, value),
            remote: format!("https://twitter.com/{value}/status/{seqno}"),
            seqno,
            sig_id: format!("{seqno:064x}"),
            signature: Signature([0u8; 64]),
            revoked,
        }
    }

    #[test]
    fn latest_proof_prefers_highest_seqno() {
        let identity = Identity {
            id: UserId::parse(&"a".repeat(32)).unwrap(),
            username: Username::parse("alice").unwrap(),
            public_key: PublicKey([1u8; 32]),
            proofs: vec![
                statement("alice", 3, false),
                statement("alice", 7, false),
                statement("alice", 9, true),
            ],
        };
        let key = ProofKey::new(ProofType::Twitter, "alice");
        assert_eq!(identity.latest_proof(&key).unwrap().seqno, 7);
    }
}
