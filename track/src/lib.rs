//! Track statement engine.
//!
//! A [`TrackSet`] is the canonical snapshot of an identity's proof states after a
//! verification run. [`diff`] compares it with the last [`TrackingStatement`] the
//! tracker signed about the same identity; any [`TrackDiffKind::Revoked`] entry
//! is a track break. [`build_statement`] and [`sign`] produce the next statement.

pub mod diff;
pub mod error;
pub mod set;
pub mod statement;

pub use diff::{diff, diff_sets, has_breaks, TrackDiff, TrackDiffKind};
pub use error::TrackError;
pub use set::{ProofState, TrackSet, TrackedProof};
pub use statement::{
    build_statement, sign, StatementBody, TrackingStatement, UnsignedStatement, STATEMENT_VERSION,
};
