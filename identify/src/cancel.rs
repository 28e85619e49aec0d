//! Run-scoped cancellation.
//!
//! A [`CancelSource`] owns the signal; every suspension point in a run holds a
//! [`CancelToken`] and `select!`s on [`CancelToken::cancelled`].

use tokio::sync::watch;

pub struct CancelSource {
    tx: watch::Sender<bool>,
}

#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancel every run holding a token from this source.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        CancelSource::new().token()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled. Pends forever if the source is dropped uncancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_every_token() {
        let source = CancelSource::new();
        let a = source.token();
        let b = a.clone();
        assert!(!a.is_cancelled());
        source.cancel();
        a.cancelled().await;
        b.cancelled().await;
        assert!(b.is_cancelled());
    }

    #[tokio::test]
    async fn token_created_after_cancel_is_cancelled() {
        let source = CancelSource::new();
        source.cancel();
        assert!(source.token().is_cancelled());
    }

    #[tokio::test]
    async fn never_token_stays_pending() {
        let token = CancelToken::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
