//! Nullable UI: records progress and answers prompts from a script.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use trackid_identify::{
    IdentifyState, IdentifyUi, ProgressEvent, ProgressKind, TrackSummary, UiError,
};
use zeroize::Zeroizing;

/// How the null UI answers a confirmation prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    No,
    /// The prompt fails with [`UiError::Unavailable`].
    Unavailable,
    /// The prompt never returns.
    Stall,
}

pub struct NullUi {
    events: Mutex<Vec<ProgressEvent>>,
    summaries: Mutex<Vec<TrackSummary>>,
    confirm: ConfirmAnswer,
    secret: Option<String>,
    prompts: AtomicUsize,
}

impl NullUi {
    /// A UI with nobody behind it: every prompt is unavailable.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            summaries: Mutex::new(Vec::new()),
            confirm: ConfirmAnswer::Unavailable,
            secret: None,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn confirming(mut self, answer: ConfirmAnswer) -> Self {
        self.confirm = answer;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The states reported, in order.
    pub fn states(&self) -> Vec<IdentifyState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e.kind {
                ProgressKind::StateChanged { state } => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Summaries shown in confirmation prompts.
    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.summaries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of prompts of either kind.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl Default for NullUi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentifyUi for NullUi {
    fn report_progress(&self, event: ProgressEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    async fn prompt_confirmation(&self, summary: &TrackSummary) -> Result<bool, UiError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.summaries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(summary.clone());
        match self.confirm {
            ConfirmAnswer::Yes => Ok(true),
            ConfirmAnswer::No => Ok(false),
            ConfirmAnswer::Unavailable => Err(UiError::Unavailable),
            ConfirmAnswer::Stall => std::future::pending().await,
        }
    }

    async fn prompt_secret(&self, _reason: &str) -> Result<Zeroizing<String>, UiError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.secret
            .clone()
            .map(Zeroizing::new)
            .ok_or(UiError::Unavailable)
    }
}
