//! The checker capability: one strategy per proof type.

use async_trait::async_trait;

use crate::error::ProofError;
use crate::prospect::ProofProspect;

/// Fetches remote evidence for a proof and confirms it is bound to the identity.
///
/// Implementations may perform network I/O but must not mutate shared state.
/// Ownership of the proof statement (its signature) has already been checked
/// by the registry when `check` is called. Timeouts are enforced by the caller.
#[async_trait]
pub trait ProofChecker: Send + Sync {
    /// Human-readable name of this checker.
    fn name(&self) -> &str;

    async fn check(&self, prospect: &ProofProspect) -> Result<(), ProofError>;
}
