use proptest::prelude::*;

use trackid_track::{diff_sets, has_breaks, ProofState, TrackDiffKind, TrackSet, TrackedProof};
use trackid_types::{ProofKey, ProofType};

fn state() -> impl Strategy<Value = ProofState> {
    prop_oneof![
        Just(ProofState::Ok),
        Just(ProofState::Revoked),
        Just(ProofState::TempFailure),
        Just(ProofState::PermFailure),
    ]
}

fn proof() -> impl Strategy<Value = TrackedProof> {
    (0usize..7, "[a-c]{1,2}", "[xy]", state()).prop_map(|(ty, value, remote, state)| {
        TrackedProof {
            key: ProofKey::new(ProofType::KNOWN[ty].clone(), value),
            remote,
            state,
        }
    })
}

fn proofs_and_shuffle() -> impl Strategy<Value = (Vec<TrackedProof>, Vec<TrackedProof>)> {
    prop::collection::vec(proof(), 0..12)
        .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
}

proptest! {
    /// Building a set from the same proofs in any order gives the same set.
    #[test]
    fn track_set_is_order_independent((a, b) in proofs_and_shuffle()) {
        prop_assert_eq!(TrackSet::new(a), TrackSet::new(b));
    }

    /// Diffs do not depend on the order verdicts arrived in.
    #[test]
    fn diff_is_order_independent(
        (cur_a, cur_b) in proofs_and_shuffle(),
        prior in prop::collection::vec(proof(), 0..12),
    ) {
        let prior = TrackSet::new(prior);
        let d1 = diff_sets(&TrackSet::new(cur_a), Some(&prior));
        let d2 = diff_sets(&TrackSet::new(cur_b), Some(&prior));
        prop_assert_eq!(d1, d2);
    }

    /// Diffing a set against itself never reports a break or a change.
    #[test]
    fn self_diff_is_unchanged(proofs in prop::collection::vec(proof(), 0..12)) {
        let set = TrackSet::new(proofs);
        let diffs = diff_sets(&set, Some(&set));
        prop_assert_eq!(diffs.len(), set.len());
        prop_assert!(diffs.iter().all(|d| d.kind == TrackDiffKind::Unchanged));
    }

    /// Every previously Ok proof that is not Ok now is a break.
    #[test]
    fn regressions_always_break(
        prior in prop::collection::vec(proof(), 1..12),
        current in prop::collection::vec(proof(), 0..12),
    ) {
        let prior = TrackSet::new(prior);
        let current = TrackSet::new(current);
        let regressed = prior.iter().any(|old| {
            old.state.is_ok()
                && current.get(&old.key).map_or(true, |cur| !cur.state.is_ok())
        });
        prop_assert_eq!(has_breaks(&diff_sets(&current, Some(&prior))), regressed);
    }
}
