//! Registry of proof checkers, keyed by proof type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use trackid_types::ProofType;

use crate::checker::ProofChecker;
use crate::config::CheckerConfig;
use crate::dns::DnsTxtChecker;
use crate::error::ProofError;
use crate::hosted::HostedProofChecker;
use crate::key_binding::KeyBindingChecker;
use crate::prospect::ProofProspect;
use crate::verdict::ProofVerdict;

/// Maps each proof type to the strategy that verifies it.
///
/// Built once at startup and shared read-only between identify runs.
#[derive(Clone)]
pub struct ProofCheckerRegistry {
    checkers: HashMap<ProofType, Arc<dyn ProofChecker>>,
}

impl ProofCheckerRegistry {
    pub fn new() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// A registry with the built-in checker for every known proof type.
    pub fn with_defaults(config: &CheckerConfig) -> Result<Self, ProofError> {
        let client = config.http_client()?;
        let mut registry = Self::new();
        for proof_type in ProofType::KNOWN.iter() {
            if let Some(hosted) = HostedProofChecker::for_type(proof_type, client.clone()) {
                registry.register(proof_type.clone(), Arc::new(hosted));
            }
        }
        registry.register(
            ProofType::Dns,
            Arc::new(DnsTxtChecker::new(config.doh_endpoint.clone(), client)),
        );
        registry.register(ProofType::Pgp, Arc::new(KeyBindingChecker));
        Ok(registry)
    }

    /// Register (or replace) the checker for `proof_type`.
    pub fn register(&mut self, proof_type: ProofType, checker: Arc<dyn ProofChecker>) {
        self.checkers.insert(proof_type, checker);
    }

    pub fn lookup(&self, proof_type: &ProofType) -> Option<Arc<dyn ProofChecker>> {
        self.checkers.get(proof_type).cloned()
    }

    /// Registered proof types.
    pub fn proof_types(&self) -> Vec<&ProofType> {
        self.checkers.keys().collect()
    }

    /// Verify one prospect. Never fails: every outcome is a verdict.
    ///
    /// The uniform checks run before any checker is consulted, in this order:
    /// supersession, explicit revocation, signature ownership, checker lookup.
    /// The checker itself runs under `timeout`; running out of time is a
    /// temporary failure.
    pub async fn verify(&self, prospect: &ProofProspect, timeout: Duration) -> ProofVerdict {
        if let Some(by_seqno) = prospect.superseded_by {
            return ProofVerdict::Superseded { by_seqno };
        }
        if prospect.statement.revoked {
            return ProofVerdict::Revoked {
                reason: "revoked by owner".to_string(),
            };
        }
        if !trackid_crypto::verify_proof_with_key(
            &prospect.uid,
            &prospect.public_key,
            &prospect.statement,
        ) {
            return ProofVerdict::PermanentFailure {
                reason: "statement is not signed by the identity's key".to_string(),
            };
        }

        let proof_type = &prospect.key().proof_type;
        let Some(checker) = self.lookup(proof_type) else {
            return ProofVerdict::PermanentFailure {
                reason: format!("no checker for proof type {proof_type}"),
            };
        };

        let verdict = match tokio::time::timeout(timeout, checker.check(prospect)).await {
            Ok(Ok(())) => ProofVerdict::Valid,
            Ok(Err(e)) => e.into_verdict(),
            Err(_) => ProofVerdict::TemporarilyUnavailable {
                reason: format!("no answer within {}ms", timeout.as_millis()),
            },
        };

        match &verdict {
            ProofVerdict::Valid => {
                debug!(proof = %prospect.key(), checker = checker.name(), "proof valid")
            }
            other => warn!(
                proof = %prospect.key(),
                checker = checker.name(),
                verdict = %other,
                "proof did not verify"
            ),
        }
        verdict
    }
}

impl Default for ProofCheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
