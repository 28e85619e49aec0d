//! Proofs whose evidence is the signature itself (PGP key bindings).

use async_trait::async_trait;

use crate::checker::ProofChecker;
use crate::error::ProofError;
use crate::prospect::ProofProspect;

/// Minimum fingerprint length accepted, in hex characters (a 64-bit key id).
const MIN_FINGERPRINT_HEX: usize = 16;

/// Accepts a key-binding proof once the registry has checked its signature,
/// provided the remote names the same fingerprint as the claim.
#[derive(Default)]
pub struct KeyBindingChecker;

#[async_trait]
impl ProofChecker for KeyBindingChecker {
    fn name(&self) -> &str {
        "key-binding"
    }

    async fn check(&self, prospect: &ProofProspect) -> Result<(), ProofError> {
        let fingerprint = &prospect.key().value;
        let well_formed = fingerprint.len() >= MIN_FINGERPRINT_HEX
            && fingerprint.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(ProofError::RemoteMismatch(format!(
                "{fingerprint} is not a key fingerprint"
            )));
        }
        if !prospect.statement.remote.eq_ignore_ascii_case(fingerprint) {
            return Err(ProofError::RemoteMismatch(format!(
                "remote {} does not name {fingerprint}",
                prospect.statement.remote
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackid_types::{ProofKey, ProofStatement, ProofType, PublicKey, Signature, UserId};

    fn prospect(value: &str, remote: &str) -> ProofProspect {
        ProofProspect {
            uid: UserId::parse(&"b".repeat(32)).unwrap(),
            public_key: PublicKey([0u8; 32]),
            statement: ProofStatement {
                key: ProofKey::new(ProofType::Pgp, value),
                remote: remote.to_string(),
                seqno: 1,
                sig_id: String::new(),
                signature: Signature([0u8; 64]),
                revoked: false,
            },
            superseded_by: None,
        }
    }

    #[tokio::test]
    async fn matching_fingerprint_is_valid() {
        let fp = "0123456789ABCDEF0123";
        assert!(KeyBindingChecker.check(&prospect(fp, fp)).await.is_ok());
    }

    #[tokio::test]
    async fn short_or_mismatched_fingerprint_fails() {
        assert!(KeyBindingChecker.check(&prospect("abcd", "abcd")).await.is_err());
        assert!(KeyBindingChecker
            .check(&prospect("0123456789abcdef", "fedcba9876543210"))
            .await
            .is_err());
    }
}
