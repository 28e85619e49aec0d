//! Identify UI for an interactive terminal.

use async_trait::async_trait;
use std::io::{BufRead, IsTerminal, Write};
use trackid_identify::{IdentifyUi, ProgressEvent, ProgressKind, TrackSummary, UiError};
use trackid_track::TrackDiffKind;
use zeroize::Zeroizing;

/// Writes progress to stderr and asks questions on stdin.
pub struct TerminalUi {
    /// Answer yes to confirmation prompts without asking.
    assume_yes: bool,
    quiet: bool,
}

impl TerminalUi {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            quiet: false,
        }
    }

    /// Suppress progress lines (for machine-readable output).
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

/// One progress line, or `None` for events not worth showing.
pub fn render_event(event: &ProgressEvent) -> Option<String> {
    match &event.kind {
        ProgressKind::Resolved { username, uid } => Some(format!("identifying {username} ({uid})")),
        ProgressKind::ProofFinished { proof, verdict } => {
            let mark = if verdict.is_valid() { "ok  " } else { "FAIL" };
            Some(format!("  [{mark}] {proof}: {}", verdict.label()))
        }
        ProgressKind::TrackBreak { proof } => Some(format!("  [BREAK] {proof} changed since last track")),
        ProgressKind::Finished { status } => Some(format!("result: {status}")),
        ProgressKind::StateChanged { .. } | ProgressKind::ProofStarted { .. } => None,
    }
}

fn render_summary(summary: &TrackSummary) -> String {
    let mut out = format!("track {} ({}), status {}\n", summary.username, summary.uid, summary.status);
    for diff in &summary.diffs {
        let note = match diff.kind {
            TrackDiffKind::New => "new",
            TrackDiffKind::Unchanged => "unchanged",
            TrackDiffKind::Revoked => "REVOKED",
            TrackDiffKind::Changed => "CHANGED",
            TrackDiffKind::None => "failing",
        };
        out.push_str(&format!("  {}: {note}\n", diff.key));
    }
    out
}

async fn read_line(prompt: String) -> Result<Zeroizing<String>, UiError> {
    if !std::io::stdin().is_terminal() {
        return Err(UiError::Unavailable);
    }
    tokio::task::spawn_blocking(move || {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{prompt}");
        let _ = stderr.flush();
        let mut line = Zeroizing::new(String::new());
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => Err(UiError::Dismissed),
            Ok(_) => Ok(Zeroizing::new(line.trim_end().to_string())),
            Err(_) => Err(UiError::Unavailable),
        }
    })
    .await
    .map_err(|_| UiError::Unavailable)?
}

#[async_trait]
impl IdentifyUi for TerminalUi {
    fn report_progress(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }
        if let Some(line) = render_event(&event) {
            eprintln!("{line}");
        }
    }

    async fn prompt_confirmation(&self, summary: &TrackSummary) -> Result<bool, UiError> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = read_line(format!("{}publish tracking statement? [y/N] ", render_summary(summary))).await?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    async fn prompt_secret(&self, reason: &str) -> Result<Zeroizing<String>, UiError> {
        read_line(format!("{reason}: ")).await
    }
}
