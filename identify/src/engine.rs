//! The identify state machine.
//!
//! One [`IdentifyEngine`] is shared by every run in the process. Each call to
//! [`IdentifyEngine::run`] walks `Start → Resolving → Verifying → Diffing →
//! (Signing) → Done`, or ends in `Aborted`, inside its own tracing span.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use trackid_assertion::{parse, Assertion};
use trackid_directory::IdentityDirectory;
use trackid_proofs::{prospects_for, ProofCheckerRegistry};
use trackid_track::{build_statement, diff, diff_sets, sign, TrackSet, TrackingStatement};
use trackid_types::{Clock, Identity};

use crate::cache::{CacheKey, IdentifyCache};
use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::{IdentifyError, KeyError, UiError};
use crate::key::SecretKeySource;
use crate::outcome::{
    compute_status, GroupIdentifyOutcome, IdentifyOutcome, IdentifyStatus, ProofResult,
};
use crate::policy::{IdentifyBehavior, IdentifyPolicy};
use crate::resolver::resolve;
use crate::state::{IdentifyState, StateMachine};
use crate::ui::{IdentifyUi, ProgressEvent, ProgressKind, TrackSummary};
use crate::verify::verify_all;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifyRequest {
    pub assertion: String,
    pub behavior: IdentifyBehavior,
    /// Sign and publish a tracking statement if the run succeeds.
    pub track: bool,
    /// Tag for progress events; generated when absent.
    pub session_id: Option<String>,
}

impl IdentifyRequest {
    pub fn new(assertion: impl Into<String>, behavior: IdentifyBehavior) -> Self {
        Self {
            assertion: assertion.into(),
            behavior,
            track: false,
            session_id: None,
        }
    }

    pub fn with_track(mut self, track: bool) -> Self {
        self.track = track;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Who is asking, and the collaborators their calling context provides.
pub struct RunContext<'a> {
    /// The caller's own identity, if logged in.
    pub me: Option<&'a Identity>,
    pub ui: &'a dyn IdentifyUi,
    pub keys: Option<&'a dyn SecretKeySource>,
    pub cancel: CancelToken,
}

impl<'a> RunContext<'a> {
    pub fn new(ui: &'a dyn IdentifyUi) -> Self {
        Self {
            me: None,
            ui,
            keys: None,
            cancel: CancelToken::never(),
        }
    }

    pub fn with_me(mut self, me: &'a Identity) -> Self {
        self.me = Some(me);
        self
    }

    pub fn with_keys(mut self, keys: &'a dyn SecretKeySource) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

pub struct IdentifyEngine {
    directory: Arc<dyn IdentityDirectory>,
    registry: Arc<ProofCheckerRegistry>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    cache: IdentifyCache,
    next_session: AtomicU64,
}

impl IdentifyEngine {
    pub fn new(
        directory: Arc<dyn IdentityDirectory>,
        registry: Arc<ProofCheckerRegistry>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let cache = IdentifyCache::new(config.cache_ttl_secs, Arc::clone(&clock));
        Self {
            directory,
            registry,
            clock,
            config,
            cache,
            next_session: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &IdentifyCache {
        &self.cache
    }

    fn new_session_id(&self) -> String {
        let n = self.next_session.fetch_add(1, Ordering::Relaxed);
        format!("{:x}-{n}", self.clock.now().as_secs())
    }

    /// Run one identification.
    ///
    /// Errors mean no outcome exists (bad assertion, unknown user, self,
    /// cancellation, timeout, UI or key trouble). Proof failures and track breaks
    /// are reported inside the outcome.
    pub async fn run(
        &self,
        request: IdentifyRequest,
        ctx: &RunContext<'_>,
    ) -> Result<IdentifyOutcome, IdentifyError> {
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| self.new_session_id());
        let span = info_span!("identify", session_id = %session_id, assertion = %request.assertion);

        async {
            let policy = request.behavior.policy();
            let budget = self.config.resolution_budget() + policy.max_proof_timeout;
            let mut run = Run {
                engine: self,
                ctx,
                session_id,
                behavior: request.behavior,
                policy,
                sm: StateMachine::new(),
                budget,
                deadline: Instant::now() + budget,
            };
            match run.execute(&request).await {
                Ok(outcome) => {
                    info!(status = %outcome.status, state = %outcome.final_state, "identify finished");
                    Ok(outcome)
                }
                Err(e) => {
                    run.transition(IdentifyState::Aborted);
                    warn!(error = %e, "identify aborted");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Identify several users at once, without tracking.
    ///
    /// Any member that fails to parse, resolve, or is the caller fails the whole call.
    pub async fn identify_group(
        &self,
        assertions: &[String],
        behavior: IdentifyBehavior,
        ctx: &RunContext<'_>,
    ) -> Result<GroupIdentifyOutcome, IdentifyError> {
        let runs = assertions
            .iter()
            .map(|a| self.run(IdentifyRequest::new(a.clone(), behavior), ctx));
        let outcomes = try_join_all(runs).await?;
        Ok(GroupIdentifyOutcome::from_outcomes(outcomes))
    }
}

struct Run<'r> {
    engine: &'r IdentifyEngine,
    ctx: &'r RunContext<'r>,
    session_id: String,
    behavior: IdentifyBehavior,
    policy: IdentifyPolicy,
    sm: StateMachine,
    budget: Duration,
    deadline: Instant,
}

impl Run<'_> {
    fn emit(&self, kind: ProgressKind) {
        self.ctx.ui.report_progress(ProgressEvent {
            session_id: self.session_id.clone(),
            kind,
        });
    }

    fn transition(&mut self, next: IdentifyState) {
        debug!(from = %self.sm.state(), to = %next, "state transition");
        self.sm.advance(next);
        self.emit(ProgressKind::StateChanged { state: next });
    }

    /// Await `fut` unless the run is cancelled or its deadline passes first.
    async fn guarded<F: Future>(&self, fut: F) -> Result<F::Output, IdentifyError> {
        tokio::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => Err(IdentifyError::Cancelled),
            res = tokio::time::timeout_at(self.deadline, fut) => {
                res.map_err(|_| IdentifyError::TimedOut { after: self.budget })
            }
        }
    }

    /// Checks beyond the concurrency limit queue for later rounds, so every
    /// round past the first gets its own proof timeout on the deadline.
    fn extend_for_rounds(&mut self, prospects: usize, concurrency_limit: usize) {
        let rounds = prospects.div_ceil(concurrency_limit.max(1)).max(1);
        let extra = self
            .policy
            .max_proof_timeout
            .saturating_mul(u32::try_from(rounds - 1).unwrap_or(u32::MAX));
        if !extra.is_zero() {
            debug!(rounds, extra_secs = extra.as_secs(), "extending run deadline");
            self.budget += extra;
            self.deadline += extra;
        }
    }

    /// Await a UI prompt. Prompts wait on a person, so only cancellation bounds them.
    async fn prompt<T, F>(&self, fut: F) -> Result<T, IdentifyError>
    where
        F: Future<Output = Result<T, UiError>>,
    {
        tokio::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => Err(IdentifyError::Cancelled),
            res = fut => res.map_err(|e| match e {
                UiError::Unavailable => IdentifyError::UiUnavailable,
                UiError::Dismissed => IdentifyError::Cancelled,
            }),
        }
    }

    async fn execute(&mut self, request: &IdentifyRequest) -> Result<IdentifyOutcome, IdentifyError> {
        let engine = self.engine;
        self.transition(IdentifyState::Resolving);

        if request.track && self.ctx.me.is_none() {
            return Err(KeyError::Missing.into());
        }
        let assertion: Assertion = parse(&request.assertion)?;
        let resolution = self
            .guarded(resolve(engine.directory.as_ref(), &assertion, self.ctx.me))
            .await??;
        let target = resolution.identity;

        if let Some(me) = self.ctx.me {
            if me.same_user(&target) {
                return Err(IdentifyError::SelfIdentify { uid: me.id.clone() });
            }
        }
        self.emit(ProgressKind::Resolved {
            uid: target.id.clone(),
            username: target.username.clone(),
        });
        self.transition(IdentifyState::Verifying);

        let cache_key = CacheKey {
            me: self.ctx.me.map(|me| me.id.clone()),
            target: target.id.clone(),
            behavior: self.behavior,
        };
        if self.policy.allow_cache && !request.track {
            if let Some(mut cached) = engine.cache.get(&cache_key).await {
                debug!(uid = %target.id, "using cached outcome");
                cached.session_id = self.session_id.clone();
                cached.from_cache = true;
                self.transition(IdentifyState::Done);
                self.emit(ProgressKind::Finished { status: cached.status });
                return Ok(cached);
            }
        }

        let prospects = prospects_for(&target);
        for prospect in &prospects {
            self.emit(ProgressKind::ProofStarted {
                proof: prospect.key().clone(),
            });
        }
        self.extend_for_rounds(prospects.len(), engine.config.concurrency_limit);
        let ui = self.ctx.ui;
        let session_id = self.session_id.clone();
        let checked = self
            .guarded(verify_all(
                Arc::clone(&engine.registry),
                prospects,
                self.policy.max_proof_timeout,
                engine.config.concurrency_limit,
                |prospect, verdict| {
                    ui.report_progress(ProgressEvent {
                        session_id: session_id.clone(),
                        kind: ProgressKind::ProofFinished {
                            proof: prospect.key().clone(),
                            verdict: verdict.clone(),
                        },
                    })
                },
            ))
            .await?;

        let track_set = TrackSet::from_verdicts(checked.iter().map(|(p, v)| (&p.statement, v)));
        let mut proofs: Vec<ProofResult> = checked
            .into_iter()
            .map(|(prospect, verdict)| ProofResult {
                key: prospect.statement.key,
                remote: prospect.statement.remote,
                seqno: prospect.statement.seqno,
                verdict,
            })
            .collect();
        proofs.sort_by(|a, b| a.key.cmp(&b.key).then(a.seqno.cmp(&b.seqno)));

        let prior = match self.ctx.me {
            Some(me) => {
                let prior = self
                    .guarded(engine.directory.latest_tracking_statement(&me.id, &target.id))
                    .await??;
                if let Some(prior) = &prior {
                    prior.verify_for(&me.public_key)?;
                }
                prior
            }
            None => None,
        };
        self.transition(IdentifyState::Diffing);

        let diffs = match self.ctx.me {
            Some(me) => diff(&me.id, &target.id, &track_set, prior.as_ref()),
            None => diff_sets(&track_set, None),
        };
        for d in diffs.iter().filter(|d| d.kind.is_break()) {
            warn!(proof = %d.key, "track break");
            self.emit(ProgressKind::TrackBreak { proof: d.key.clone() });
        }

        let unmet_assertions: Vec<String> = resolution
            .matched
            .terms
            .iter()
            .filter_map(|term| term.proof_key().map(|key| (term, key)))
            .filter(|(_, key)| !proofs.iter().any(|p| &p.key == key && p.verdict.is_valid()))
            .map(|(term, _)| term.to_string())
            .collect();

        let status = compute_status(&proofs, &diffs, &unmet_assertions, &self.policy);
        let mut outcome = IdentifyOutcome {
            session_id: self.session_id.clone(),
            behavior: self.behavior,
            target,
            proofs,
            track_set,
            diffs,
            unmet_assertions,
            status,
            final_state: IdentifyState::Diffing,
            statement: None,
            from_cache: false,
            ctime: engine.clock.now(),
        };

        if request.track {
            if status == IdentifyStatus::Failed {
                info!("not tracking a failed identify");
                self.transition(IdentifyState::Aborted);
            } else if self.confirm_track(&outcome).await? {
                self.transition(IdentifyState::Signing);
                outcome.statement = Some(self.sign_and_publish(&outcome, prior.as_ref()).await?);
                self.transition(IdentifyState::Done);
            } else {
                info!("tracking declined");
                self.transition(IdentifyState::Done);
            }
        } else {
            self.transition(IdentifyState::Done);
            if self.policy.allow_cache && status == IdentifyStatus::Clean {
                engine.cache.insert(cache_key, outcome.clone()).await;
            }
        }

        outcome.final_state = self.sm.state();
        self.emit(ProgressKind::Finished { status });
        Ok(outcome)
    }

    async fn confirm_track(&self, outcome: &IdentifyOutcome) -> Result<bool, IdentifyError> {
        if self.policy.allow_unattended_signing {
            return Ok(true);
        }
        let summary = TrackSummary {
            username: outcome.target.username.clone(),
            uid: outcome.target.id.clone(),
            status: outcome.status,
            track_set: outcome.track_set.clone(),
            diffs: outcome.diffs.clone(),
        };
        self.prompt(self.ctx.ui.prompt_confirmation(&summary)).await
    }

    async fn sign_and_publish(
        &self,
        outcome: &IdentifyOutcome,
        prior: Option<&TrackingStatement>,
    ) -> Result<TrackingStatement, IdentifyError> {
        let me = self.ctx.me.ok_or(KeyError::Missing)?;
        let keys = self.ctx.keys.ok_or(KeyError::Missing)?;
        if keys.public_key() != me.public_key {
            return Err(KeyError::WrongKey(me.id.clone()).into());
        }

        let passphrase = if keys.needs_passphrase() {
            Some(self.prompt(self.ctx.ui.prompt_secret("unlock your signing key")).await?)
        } else {
            None
        };
        let private_key = keys.unlock(passphrase.as_deref().map(String::as_str)).await?;

        let unsigned = build_statement(
            me.id.clone(),
            outcome.target.id.clone(),
            outcome.target.public_key.clone(),
            outcome.track_set.clone(),
            self.engine.clock.now(),
            prior,
        );
        let statement = sign(unsigned, private_key);
        statement.verify_for(&me.public_key)?;

        self.guarded_publish(&statement).await?;
        info!(id = %statement.id(), tracked = %outcome.target.username, "tracking statement published");
        Ok(statement)
    }

    async fn guarded_publish(&self, statement: &TrackingStatement) -> Result<(), IdentifyError> {
        tokio::select! {
            biased;
            _ = self.ctx.cancel.cancelled() => Err(IdentifyError::Cancelled),
            res = self.engine.directory.publish_tracking_statement(statement) => Ok(res?),
        }
    }
}
