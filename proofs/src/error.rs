//! Checker-internal failures and their uniform mapping onto verdicts.

use thiserror::Error;

use crate::verdict::ProofVerdict;

/// Why a checker could not confirm a proof.
///
/// These never escape the registry as errors: [`ProofError::into_verdict`] is
/// the single place where retry classification happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    #[error("remote server error: HTTP {0}")]
    ServerError(u16),

    #[error("proof was deleted from the remote service")]
    Deleted,

    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    #[error("remote evidence does not contain the proof signature id")]
    EvidenceMissing,

    #[error("remote location does not belong to the claimed account: {0}")]
    RemoteMismatch(String),

    #[error("invalid response from remote: {0}")]
    InvalidResponse(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ProofError {
    /// Only transport-level trouble is worth retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::ServerError(_))
    }

    pub fn into_verdict(self) -> ProofVerdict {
        let reason = self.to_string();
        match self {
            Self::Unreachable(_) | Self::ServerError(_) => {
                ProofVerdict::TemporarilyUnavailable { reason }
            }
            Self::Deleted => ProofVerdict::Revoked { reason },
            Self::BadStatus(_)
            | Self::EvidenceMissing
            | Self::RemoteMismatch(_)
            | Self::InvalidResponse(_)
            | Self::Client(_) => ProofVerdict::PermanentFailure { reason },
        }
    }
}

impl From<reqwest::Error> for ProofError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProofError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ProofError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            ProofError::InvalidResponse(e.to_string())
        } else {
            ProofError::Unreachable(e.to_string())
        }
    }
}
