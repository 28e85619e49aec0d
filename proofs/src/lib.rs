//! Proof verification.
//!
//! Each proof in an identity's table becomes a [`ProofProspect`]. The
//! [`ProofCheckerRegistry`] maps a proof type to a [`ProofChecker`] strategy, runs
//! the uniform pre-checks (supersession, revocation, signature ownership), enforces
//! the per-proof timeout, and turns every outcome into a [`ProofVerdict`].
//!
//! Verdicts are data, never errors: one unverifiable proof cannot abort the
//! verification of the others.

pub mod checker;
pub mod config;
pub mod dns;
pub mod error;
pub mod hosted;
pub mod key_binding;
pub mod prospect;
pub mod registry;
pub mod verdict;

pub use checker::ProofChecker;
pub use config::CheckerConfig;
pub use dns::DnsTxtChecker;
pub use error::ProofError;
pub use hosted::HostedProofChecker;
pub use key_binding::KeyBindingChecker;
pub use prospect::{prospects_for, ProofProspect};
pub use registry::ProofCheckerRegistry;
pub use verdict::ProofVerdict;
