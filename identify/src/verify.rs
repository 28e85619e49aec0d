//! Concurrent proof verification for one run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use trackid_proofs::{ProofCheckerRegistry, ProofProspect, ProofVerdict};

/// Verify every prospect, at most `concurrency_limit` at a time.
///
/// Waits for all checks; each is bounded by `timeout` inside the registry.
/// Results come back in prospect order whatever order the checks finish in.
/// `on_finished` sees each verdict as it lands. Dropping the returned future
/// aborts every check still in flight.
pub async fn verify_all(
    registry: Arc<ProofCheckerRegistry>,
    prospects: Vec<ProofProspect>,
    timeout: Duration,
    concurrency_limit: usize,
    mut on_finished: impl FnMut(&ProofProspect, &ProofVerdict),
) -> Vec<(ProofProspect, ProofVerdict)> {
    let semaphore = Arc::new(Semaphore::new(concurrency_limit.max(1)));
    let mut tasks = JoinSet::new();

    for (index, prospect) in prospects.iter().cloned().enumerate() {
        let registry = Arc::clone(&registry);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let verdict = match semaphore.acquire_owned().await {
                Ok(_permit) => registry.verify(&prospect, timeout).await,
                Err(_) => ProofVerdict::TemporarilyUnavailable {
                    reason: "verification pool closed".to_string(),
                },
            };
            (index, verdict)
        });
    }

    let mut verdicts: Vec<Option<ProofVerdict>> = vec![None; prospects.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, verdict)) => {
                on_finished(&prospects[index], &verdict);
                verdicts[index] = Some(verdict);
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => {}
        }
    }

    prospects
        .into_iter()
        .zip(verdicts)
        .map(|(prospect, verdict)| {
            let verdict = verdict.unwrap_or_else(|| ProofVerdict::TemporarilyUnavailable {
                reason: "check did not complete".to_string(),
            });
            (prospect, verdict)
        })
        .collect()
}
