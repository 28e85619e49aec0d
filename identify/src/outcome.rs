//! Results handed back to the caller of an identify run.

use serde::{Deserialize, Serialize};
use std::fmt;
use trackid_proofs::ProofVerdict;
use trackid_track::{TrackDiff, TrackSet, TrackingStatement};
use trackid_types::{Identity, ProofKey, Timestamp, UserId, Username};

use crate::policy::{IdentifyBehavior, IdentifyPolicy};
use crate::state::IdentifyState;

/// Overall verdict of a run. Ordered from best to worst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifyStatus {
    Clean,
    HasBreaks,
    Failed,
}

impl fmt::Display for IdentifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::HasBreaks => "has_breaks",
            Self::Failed => "failed",
        })
    }
}

/// The verdict for one statement in the target's proof table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofResult {
    pub key: ProofKey,
    pub remote: String,
    pub seqno: u64,
    pub verdict: ProofVerdict,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyOutcome {
    pub session_id: String,
    pub behavior: IdentifyBehavior,
    pub target: Identity,
    /// One entry per proof statement, sorted by key then seqno.
    pub proofs: Vec<ProofResult>,
    pub track_set: TrackSet,
    pub diffs: Vec<TrackDiff>,
    /// Typed terms of the matched assertion with no valid proof behind them.
    pub unmet_assertions: Vec<String>,
    pub status: IdentifyStatus,
    pub final_state: IdentifyState,
    /// The statement signed by this run, if tracking was requested and confirmed.
    pub statement: Option<TrackingStatement>,
    pub from_cache: bool,
    pub ctime: Timestamp,
}

impl IdentifyOutcome {
    pub fn breaks(&self) -> impl Iterator<Item = &TrackDiff> {
        self.diffs.iter().filter(|d| d.kind.is_break())
    }

    /// Proof keys that are broken or hard-failed, sorted and deduplicated.
    pub fn broken_proofs(&self) -> Vec<ProofKey> {
        let mut keys: Vec<ProofKey> = self
            .breaks()
            .map(|d| d.key.clone())
            .chain(
                self.proofs
                    .iter()
                    .filter(|p| p.verdict.is_hard_failure())
                    .map(|p| p.key.clone()),
            )
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Fold verdicts, track diffs, and unmet assertion terms into one status.
///
/// Commutative in every argument: the inputs are only tested for membership.
pub fn compute_status(
    proofs: &[ProofResult],
    diffs: &[TrackDiff],
    unmet_assertions: &[String],
    policy: &IdentifyPolicy,
) -> IdentifyStatus {
    let mut status = IdentifyStatus::Clean;
    if diffs.iter().any(|d| d.kind.is_break()) {
        status = status.max(IdentifyStatus::HasBreaks);
    }
    if proofs.iter().any(|p| p.verdict.is_hard_failure()) {
        let escalated = if policy.escalate_revoked_to_failure {
            IdentifyStatus::Failed
        } else {
            IdentifyStatus::HasBreaks
        };
        status = status.max(escalated);
    }
    if !unmet_assertions.is_empty() {
        status = IdentifyStatus::Failed;
    }
    status
}

/// A member of a group query that did not come back clean.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBreaks {
    pub user: Username,
    pub uid: UserId,
    pub status: IdentifyStatus,
    pub proofs: Vec<ProofKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupIdentifyOutcome {
    /// Resolved usernames, sorted, joined with `,`.
    pub canonical_name: String,
    /// Per-member outcomes, in request order.
    pub outcomes: Vec<IdentifyOutcome>,
    pub breaks: Vec<UserBreaks>,
}

impl GroupIdentifyOutcome {
    pub fn from_outcomes(outcomes: Vec<IdentifyOutcome>) -> Self {
        let mut names: Vec<&str> = outcomes.iter().map(|o| o.target.username.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        let canonical_name = names.join(",");

        let breaks = outcomes
            .iter()
            .filter(|o| o.status != IdentifyStatus::Clean)
            .map(|o| UserBreaks {
                user: o.target.username.clone(),
                uid: o.target.id.clone(),
                status: o.status,
                proofs: o.broken_proofs(),
            })
            .collect();

        Self {
            canonical_name,
            outcomes,
            breaks,
        }
    }
}
