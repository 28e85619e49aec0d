//! Track sets: the canonical, order-independent snapshot of proof states.

use serde::{Deserialize, Serialize};
use trackid_proofs::ProofVerdict;
use trackid_types::{ProofKey, ProofStatement};

/// Verification state of one proof as recorded in a track set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofState {
    Ok,
    Revoked,
    TempFailure,
    PermFailure,
}

impl ProofState {
    /// The recorded state for a verdict. Superseded proofs are not recorded.
    pub fn from_verdict(verdict: &ProofVerdict) -> Option<Self> {
        match verdict {
            ProofVerdict::Valid => Some(Self::Ok),
            ProofVerdict::Revoked { .. } => Some(Self::Revoked),
            ProofVerdict::TemporarilyUnavailable { .. } => Some(Self::TempFailure),
            ProofVerdict::PermanentFailure { .. } => Some(Self::PermFailure),
            ProofVerdict::Superseded { .. } => None,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedProof {
    pub key: ProofKey,
    pub remote: String,
    pub state: ProofState,
}

/// A set of tracked proofs, at most one per proof key, kept sorted by key.
///
/// Equality ignores the order in which proofs were inserted, so two sets built
/// from the same verdicts in different completion orders compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<TrackedProof>", into = "Vec<TrackedProof>")]
pub struct TrackSet {
    proofs: Vec<TrackedProof>,
}

impl TrackSet {
    /// Build a set from tracked proofs. When a key repeats, the worst state wins
    /// so the set never reports a key healthier than some observation of it.
    pub fn new(proofs: impl IntoIterator<Item = TrackedProof>) -> Self {
        let mut proofs: Vec<TrackedProof> = proofs.into_iter().collect();
        proofs.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| severity(a.state).cmp(&severity(b.state)).reverse())
                .then_with(|| a.remote.cmp(&b.remote))
        });
        proofs.dedup_by(|later, earlier| later.key == earlier.key);
        Self { proofs }
    }

    /// Build a set from statements and their verdicts. Superseded statements are skipped.
    pub fn from_verdicts<'a>(
        verdicts: impl IntoIterator<Item = (&'a ProofStatement, &'a ProofVerdict)>,
    ) -> Self {
        Self::new(verdicts.into_iter().filter_map(|(statement, verdict)| {
            ProofState::from_verdict(verdict).map(|state| TrackedProof {
                key: statement.key.clone(),
                remote: statement.remote.clone(),
                state,
            })
        }))
    }

    pub fn get(&self, key: &ProofKey) -> Option<&TrackedProof> {
        self.proofs
            .binary_search_by(|p| p.key.cmp(key))
            .ok()
            .map(|i| &self.proofs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedProof> {
        self.proofs.iter()
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    /// Whether every tracked proof is currently `Ok`.
    pub fn all_ok(&self) -> bool {
        self.proofs.iter().all(|p| p.state.is_ok())
    }
}

fn severity(state: ProofState) -> u8 {
    match state {
        ProofState::Ok => 0,
        ProofState::TempFailure => 1,
        ProofState::PermFailure => 2,
        ProofState::Revoked => 3,
    }
}

impl From<Vec<TrackedProof>> for TrackSet {
    fn from(proofs: Vec<TrackedProof>) -> Self {
        Self::new(proofs)
    }
}

impl From<TrackSet> for Vec<TrackedProof> {
    fn from(set: TrackSet) -> Self {
        set.proofs
    }
}

impl<'a> IntoIterator for &'a TrackSet {
    type Item = &'a TrackedProof;
    type IntoIter = std::slice::Iter<'a, TrackedProof>;

    fn into_iter(self) -> Self::IntoIter {
        self.proofs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackid_types::ProofType;

    fn tp(ty: ProofType, value: &str, state: ProofState) -> TrackedProof {
        TrackedProof {
            key: ProofKey::new(ty, value),
            remote: format!("remote-{value}"),
            state,
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = TrackSet::new([
            tp(ProofType::Twitter, "bob", ProofState::Ok),
            tp(ProofType::Github, "bob", ProofState::Revoked),
        ]);
        let b = TrackSet::new([
            tp(ProofType::Github, "bob", ProofState::Revoked),
            tp(ProofType::Twitter, "bob", ProofState::Ok),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn duplicate_keys_keep_worst_state() {
        let set = TrackSet::new([
            tp(ProofType::Dns, "a.com", ProofState::Ok),
            tp(ProofType::Dns, "a.com", ProofState::TempFailure),
        ]);
        assert_eq!(set.len(), 1);
        let key = ProofKey::new(ProofType::Dns, "a.com");
        assert_eq!(set.get(&key).unwrap().state, ProofState::TempFailure);
    }

    #[test]
    fn superseded_verdicts_are_skipped() {
        assert_eq!(ProofState::from_verdict(&ProofVerdict::Superseded { by_seqno: 3 }), None);
        assert_eq!(ProofState::from_verdict(&ProofVerdict::Valid), Some(ProofState::Ok));
    }

    #[test]
    fn deserialization_normalises_order() {
        let json = r#"[
            {"key":{"type":"github","value":"b"},"remote":"r","state":"revoked"},
            {"key":{"type":"twitter","value":"b"},"remote":"r","state":"ok"}
        ]"#;
        let set: TrackSet = serde_json::from_str(json).unwrap();
        let keys: Vec<String> = set.iter().map(|p| p.key.to_string()).collect();
        assert_eq!(keys, ["twitter:b", "github:b"]);
    }
}
