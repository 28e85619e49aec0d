//! Nullable proof checker: scripted results, optional delays, call accounting.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trackid_proofs::{ProofChecker, ProofCheckerRegistry, ProofError, ProofProspect};
use trackid_types::{ProofKey, ProofType};

/// Answers every check with `Ok(())` unless told otherwise for that proof key.
#[derive(Default)]
pub struct NullChecker {
    results: Mutex<HashMap<ProofKey, ProofError>>,
    delays: Mutex<HashMap<ProofKey, Duration>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NullChecker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail checks of `key` with `error`.
    pub fn fail(&self, key: ProofKey, error: ProofError) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, error);
    }

    /// Let checks of `key` succeed again.
    pub fn heal(&self, key: &ProofKey) {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    /// Make checks of `key` take `delay`.
    pub fn delay(&self, key: ProofKey, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most checks ever running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Checks started but not finished (aborted ones included until dropped).
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// A registry that routes every known proof type to `checker`.
    pub fn registry(checker: &Arc<Self>) -> ProofCheckerRegistry {
        let mut registry = ProofCheckerRegistry::new();
        for proof_type in ProofType::KNOWN.iter() {
            registry.register(proof_type.clone(), Arc::clone(checker) as Arc<dyn ProofChecker>);
        }
        registry
    }
}

#[async_trait]
impl ProofChecker for NullChecker {
    fn name(&self) -> &str {
        "null"
    }

    async fn check(&self, prospect: &ProofProspect) -> Result<(), ProofError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(prospect.key())
            .copied();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            // Yield so concurrent checks overlap.
            None => tokio::task::yield_now().await,
        }

        match self
            .results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(prospect.key())
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
