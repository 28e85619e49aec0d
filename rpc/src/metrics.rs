//! Prometheus metrics for identify runs.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use trackid_identify::{GroupIdentifyOutcome, IdentifyOutcome};

use crate::error::RpcError;

pub struct RpcMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Finished runs, by status (`clean`, `has_breaks`, `failed`, `error`).
    pub runs: IntCounterVec,
    /// Proof checks, by verdict label.
    pub proof_checks: IntCounterVec,
    /// Track diffs that were breaks.
    pub track_breaks: IntCounter,
    /// Runs answered from the outcome cache.
    pub cache_hits: IntCounter,
    /// Error replies, by wire code.
    pub errors: IntCounterVec,

    // ── Histograms ──────────────────────────────────────────────────────
    pub run_duration_seconds: Histogram,
    /// Wall time of whole group calls; members are not observed one by one.
    pub group_duration_seconds: Histogram,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let runs = register_int_counter_vec_with_registry!(
            Opts::new("trackid_identify_runs_total", "Identify runs by final status"),
            &["status"],
            registry
        )
        .expect("failed to register runs counter");

        let proof_checks = register_int_counter_vec_with_registry!(
            Opts::new("trackid_proof_checks_total", "Proof checks by verdict"),
            &["verdict"],
            registry
        )
        .expect("failed to register proof_checks counter");

        let track_breaks = register_int_counter_with_registry!(
            Opts::new("trackid_track_breaks_total", "Track breaks detected"),
            registry
        )
        .expect("failed to register track_breaks counter");

        let cache_hits = register_int_counter_with_registry!(
            Opts::new("trackid_cache_hits_total", "Runs answered from the outcome cache"),
            registry
        )
        .expect("failed to register cache_hits counter");

        let errors = register_int_counter_vec_with_registry!(
            Opts::new("trackid_rpc_errors_total", "Error replies by code"),
            &["code"],
            registry
        )
        .expect("failed to register errors counter");

        // 10 ms → ~40 s.
        let run_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "trackid_identify_duration_seconds",
                "Wall time of identify runs in seconds"
            )
            .buckets(prometheus::exponential_buckets(0.01, 2.0, 13).expect("valid buckets")),
            registry
        )
        .expect("failed to register run_duration histogram");

        let group_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "trackid_identify_group_duration_seconds",
                "Wall time of group identify calls in seconds"
            )
            .buckets(prometheus::exponential_buckets(0.01, 2.0, 13).expect("valid buckets")),
            registry
        )
        .expect("failed to register group_duration histogram");

        Self {
            registry,
            runs,
            proof_checks,
            track_breaks,
            cache_hits,
            errors,
            run_duration_seconds,
            group_duration_seconds,
        }
    }

    pub fn record_outcome(&self, outcome: &IdentifyOutcome, elapsed: Duration) {
        self.run_duration_seconds.observe(elapsed.as_secs_f64());
        self.count_outcome(outcome);
    }

    /// Count every member run, and observe the call's wall time once.
    pub fn record_group(&self, group: &GroupIdentifyOutcome, elapsed: Duration) {
        self.group_duration_seconds.observe(elapsed.as_secs_f64());
        for member in &group.outcomes {
            self.count_outcome(member);
        }
    }

    fn count_outcome(&self, outcome: &IdentifyOutcome) {
        self.runs
            .with_label_values(&[&outcome.status.to_string()])
            .inc();
        if outcome.from_cache {
            self.cache_hits.inc();
            return;
        }
        for proof in &outcome.proofs {
            self.proof_checks
                .with_label_values(&[proof.verdict.label()])
                .inc();
        }
        self.track_breaks.inc_by(outcome.breaks().count() as u64);
    }

    pub fn record_error(&self, err: &RpcError) {
        self.runs.with_label_values(&["error"]).inc();
        self.errors.with_label_values(&[err.code()]).inc();
    }

    /// Everything in the registry, in text exposition format.
    pub fn encode(&self) -> Result<String, RpcError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| RpcError::Server(format!("metrics encoding failed: {e}")))?;
        String::from_utf8(buf).map_err(|e| RpcError::Server(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}
