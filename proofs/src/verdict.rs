//! The outcome of checking one proof.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict for one [`ProofProspect`](crate::ProofProspect). Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProofVerdict {
    /// The remote evidence exists and is bound to the identity.
    Valid,
    /// The owner revoked the proof, or the remote evidence was deleted.
    Revoked { reason: String },
    /// The remote could not be reached in time; retrying may succeed.
    TemporarilyUnavailable { reason: String },
    /// The evidence is wrong, missing, or cannot be checked at all.
    PermanentFailure { reason: String },
    /// A later statement for the same proof key replaced this one.
    Superseded { by_seqno: u64 },
}

impl ProofVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Revoked or permanently failed: the verdicts strict policies escalate.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::Revoked { .. } | Self::PermanentFailure { .. })
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::TemporarilyUnavailable { .. })
    }

    /// Short machine-friendly label, used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Revoked { .. } => "revoked",
            Self::TemporarilyUnavailable { .. } => "temporarily_unavailable",
            Self::PermanentFailure { .. } => "permanent_failure",
            Self::Superseded { .. } => "superseded",
        }
    }
}

impl fmt::Display for ProofVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Revoked { reason }
            | Self::TemporarilyUnavailable { reason }
            | Self::PermanentFailure { reason } => write!(f, "{} ({reason})", self.label()),
            Self::Superseded { by_seqno } => write!(f, "superseded by #{by_seqno}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_status_tag() {
        let v = ProofVerdict::Revoked { reason: "gone".into() };
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"status":"revoked","reason":"gone"}"#);
        assert_eq!(serde_json::to_string(&ProofVerdict::Valid).unwrap(), r#"{"status":"valid"}"#);
    }

    #[test]
    fn classification() {
        assert!(ProofVerdict::Valid.is_valid());
        assert!(ProofVerdict::PermanentFailure { reason: String::new() }.is_hard_failure());
        assert!(!ProofVerdict::Superseded { by_seqno: 2 }.is_hard_failure());
        assert!(ProofVerdict::TemporarilyUnavailable { reason: String::new() }.is_retriable());
    }
}
