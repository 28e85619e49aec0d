//! States of an identify run and the legal moves between them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifyState {
    Start,
    Resolving,
    Verifying,
    Diffing,
    Signing,
    Done,
    Aborted,
}

impl IdentifyState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    pub fn can_transition_to(self, next: IdentifyState) -> bool {
        use IdentifyState::*;
        match (self, next) {
            (Start, Resolving)
            | (Resolving, Verifying)
            | (Verifying, Diffing)
            | (Diffing, Signing)
            | (Diffing, Done)
            | (Signing, Done) => true,
            // A cached outcome skips verification entirely.
            (Verifying, Done) => true,
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for IdentifyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Resolving => "resolving",
            Self::Verifying => "verifying",
            Self::Diffing => "diffing",
            Self::Signing => "signing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Current state plus the path taken to reach it.
#[derive(Clone, Debug)]
pub struct StateMachine {
    state: IdentifyState,
    history: Vec<IdentifyState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: IdentifyState::Start,
            history: vec![IdentifyState::Start],
        }
    }

    pub fn state(&self) -> IdentifyState {
        self.state
    }

    pub fn history(&self) -> &[IdentifyState] {
        &self.history
    }

    /// Move to `next`.
    ///
    /// # Panics
    ///
    /// On an illegal transition. The engine drives the machine; an illegal move is a bug.
    pub fn advance(&mut self, next: IdentifyState) {
        assert!(
            self.state.can_transition_to(next),
            "illegal identify transition {} -> {next}",
            self.state
        );
        self.state = next;
        self.history.push(next);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IdentifyState::*;

    #[test]
    fn happy_path_with_signing() {
        let mut sm = StateMachine::new();
        for s in [Resolving, Verifying, Diffing, Signing, Done] {
            sm.advance(s);
        }
        assert_eq!(sm.history(), [Start, Resolving, Verifying, Diffing, Signing, Done]);
    }

    #[test]
    fn abort_from_any_live_state() {
        for s in [Start, Resolving, Verifying, Diffing, Signing] {
            assert!(s.can_transition_to(Aborted), "{s}");
        }
        assert!(!Done.can_transition_to(Aborted));
        assert!(!Aborted.can_transition_to(Aborted));
    }

    #[test]
    #[should_panic(expected = "illegal identify transition")]
    fn skipping_resolution_panics() {
        StateMachine::new().advance(Verifying);
    }

    #[test]
    fn no_signing_without_diffing() {
        assert!(!Verifying.can_transition_to(Signing));
        assert!(!Resolving.can_transition_to(Diffing));
    }
}
