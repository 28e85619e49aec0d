//! Comparing a fresh track set against the last signed statement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use trackid_types::{ProofKey, UserId};

use crate::set::{TrackSet, TrackedProof};
use crate::statement::TrackingStatement;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDiffKind {
    /// Ok now, and not Ok (or not present) at the last track.
    New,
    /// Same state as at the last track.
    Unchanged,
    /// Ok at the last track, failing or gone now. This is a track break.
    Revoked,
    /// Ok both times, but the proof now points somewhere else.
    Changed,
    /// Failing now and never tracked as Ok: nothing to break.
    None,
}

impl TrackDiffKind {
    pub fn is_break(self) -> bool {
        self == Self::Revoked
    }
}

impl fmt::Display for TrackDiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::New => "new",
            Self::Unchanged => "unchanged",
            Self::Revoked => "revoked",
            Self::Changed => "changed",
            Self::None => "none",
        })
    }
}

/// Classification of one proof key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackDiff {
    pub key: ProofKey,
    pub kind: TrackDiffKind,
    /// Remote in the current run, if the proof is still present.
    pub remote: Option<String>,
    /// Remote recorded in the prior statement, if the proof was tracked.
    pub prior_remote: Option<String>,
}

/// Diff `current` against `prior`, the most recent statement by `tracker` about `tracked`.
///
/// Output is sorted by proof key.
///
/// # Panics
///
/// If `prior` belongs to a different (tracker, tracked) pair. Callers load the
/// prior statement for the pair they are diffing; anything else is a bug.
pub fn diff(
    tracker: &UserId,
    tracked: &UserId,
    current: &TrackSet,
    prior: Option<&TrackingStatement>,
) -> Vec<TrackDiff> {
    if let Some(prior) = prior {
        assert!(
            &prior.body.tracker == tracker && &prior.body.tracked == tracked,
            "diffing {tracker}->{tracked} against a statement for {}->{}",
            prior.body.tracker,
            prior.body.tracked,
        );
    }
    diff_sets(current, prior.map(|p| &p.body.track_set))
}

/// Diff two track sets directly. `None` means nothing was ever tracked.
pub fn diff_sets(current: &TrackSet, prior: Option<&TrackSet>) -> Vec<TrackDiff> {
    let empty = TrackSet::default();
    let prior = prior.unwrap_or(&empty);

    let keys: BTreeSet<&ProofKey> = current
        .iter()
        .chain(prior.iter())
        .map(|p| &p.key)
        .collect();

    keys.into_iter()
        .filter_map(|key| classify(current.get(key), prior.get(key)).map(|kind| (key, kind)))
        .map(|(key, kind)| TrackDiff {
            key: key.clone(),
            kind,
            remote: current.get(key).map(|p| p.remote.clone()),
            prior_remote: prior.get(key).map(|p| p.remote.clone()),
        })
        .collect()
}

fn classify(current: Option<&TrackedProof>, prior: Option<&TrackedProof>) -> Option<TrackDiffKind> {
    let kind = match (current, prior) {
        (Some(cur), Some(old)) => match (cur.state.is_ok(), old.state.is_ok()) {
            (true, true) if cur.remote == old.remote => TrackDiffKind::Unchanged,
            (true, true) => TrackDiffKind::Changed,
            (false, true) => TrackDiffKind::Revoked,
            (true, false) => TrackDiffKind::New,
            (false, false) => TrackDiffKind::Unchanged,
        },
        (Some(cur), None) if cur.state.is_ok() => TrackDiffKind::New,
        (Some(_), None) => TrackDiffKind::None,
        (None, Some(old)) if old.state.is_ok() => TrackDiffKind::Revoked,
        (None, _) => return None,
    };
    Some(kind)
}

/// Whether any diff is a track break.
pub fn has_breaks(diffs: &[TrackDiff]) -> bool {
    diffs.iter().any(|d| d.kind.is_break())
}
