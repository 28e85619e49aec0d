//! SIGINT/SIGTERM handling.
//!
//! The controller fans one shutdown signal out over a broadcast channel: the
//! RPC server drains on it and a running identify is cancelled by it.

use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use trackid_identify::{CancelSource, CancelToken};

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// A future that resolves once shutdown is triggered, for graceful server stops.
    pub fn signalled(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// A cancellation token that fires on shutdown.
    pub fn cancel_token(&self) -> CancelToken {
        let source = CancelSource::new();
        let token = source.token();
        let signalled = self.signalled();
        tokio::spawn(async move {
            signalled.await;
            source.cancel();
        });
        token
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_resolves_signalled_futures() {
        let controller = ShutdownController::new();
        let a = controller.signalled();
        let b = controller.signalled();
        controller.shutdown();
        a.await;
        b.await;
    }

    #[tokio::test]
    async fn shutdown_cancels_tokens() {
        let controller = ShutdownController::new();
        let token = controller.cancel_token();
        assert!(!token.is_cancelled());
        controller.shutdown();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
