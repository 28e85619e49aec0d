//! The UI capability an identify run talks to.
//!
//! One implementation per calling context, injected when the run starts. The
//! engine never branches on which UI it holds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trackid_proofs::ProofVerdict;
use trackid_track::{TrackDiff, TrackSet};
use trackid_types::{ProofKey, UserId, Username};
use zeroize::Zeroizing;

use crate::error::UiError;
use crate::outcome::IdentifyStatus;
use crate::state::IdentifyState;

/// A progress notification. Best-effort: losing one never changes the outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub session_id: String,
    #[serde(flatten)]
    pub kind: ProgressKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressKind {
    StateChanged {
        state: IdentifyState,
    },
    Resolved {
        uid: UserId,
        username: Username,
    },
    ProofStarted {
        proof: ProofKey,
    },
    ProofFinished {
        proof: ProofKey,
        verdict: ProofVerdict,
    },
    TrackBreak {
        proof: ProofKey,
    },
    Finished {
        status: IdentifyStatus,
    },
}

/// What the user is asked to confirm before a tracking statement is signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackSummary {
    pub username: Username,
    pub uid: UserId,
    pub status: IdentifyStatus,
    pub track_set: TrackSet,
    pub diffs: Vec<TrackDiff>,
}

#[async_trait]
pub trait IdentifyUi: Send + Sync {
    /// Must not block.
    fn report_progress(&self, event: ProgressEvent);

    /// Ask whether to sign a tracking statement for `summary`.
    async fn prompt_confirmation(&self, summary: &TrackSummary) -> Result<bool, UiError>;

    /// Ask for a secret, such as the signing key's passphrase.
    async fn prompt_secret(&self, reason: &str) -> Result<Zeroizing<String>, UiError>;
}

/// A UI for contexts with nobody to ask: progress is dropped and every prompt
/// is [`UiError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUi;

#[async_trait]
impl IdentifyUi for NoUi {
    fn report_progress(&self, _event: ProgressEvent) {}

    async fn prompt_confirmation(&self, _summary: &TrackSummary) -> Result<bool, UiError> {
        Err(UiError::Unavailable)
    }

    async fn prompt_secret(&self, _reason: &str) -> Result<Zeroizing<String>, UiError> {
        Err(UiError::Unavailable)
    }
}
