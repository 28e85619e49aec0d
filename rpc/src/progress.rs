//! A UI that has nobody behind it except progress subscribers.

use async_trait::async_trait;
use tokio::sync::broadcast;
use trackid_identify::{IdentifyUi, ProgressEvent, TrackSummary, UiError};
use zeroize::Zeroizing;

/// Forwards progress events to a broadcast channel. Prompts are always unavailable,
/// so only contexts that sign unattended can track over RPC.
#[derive(Clone)]
pub struct ChannelUi {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ChannelUi {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl IdentifyUi for ChannelUi {
    fn report_progress(&self, event: ProgressEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    async fn prompt_confirmation(&self, _summary: &TrackSummary) -> Result<bool, UiError> {
        Err(UiError::Unavailable)
    }

    async fn prompt_secret(&self, _reason: &str) -> Result<Zeroizing<String>, UiError> {
        Err(UiError::Unavailable)
    }
}
