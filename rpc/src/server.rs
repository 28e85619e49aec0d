//! Axum router and server.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use trackid_identify::{
    CancelToken, IdentifyEngine, IdentifyRequest, ProgressEvent, RunContext, SecretKeySource,
};
use trackid_types::Identity;

use crate::api::{check_version, GroupArgs, GroupReply, IdentifyArgs, IdentifyReply, API_VERSION};
use crate::error::RpcError;
use crate::metrics::RpcMetrics;
use crate::progress::ChannelUi;

/// Everything a request handler needs.
pub struct RpcState {
    pub engine: Arc<IdentifyEngine>,
    pub metrics: Arc<RpcMetrics>,
    pub ui: ChannelUi,
    /// The identity the server acts as, for track diffs and signing.
    pub me: Option<Identity>,
    pub keys: Option<Arc<dyn SecretKeySource>>,
    /// Cancels every in-flight run, so graceful shutdown never waits on a hung one.
    pub cancel: CancelToken,
}

impl RpcState {
    pub fn new(engine: Arc<IdentifyEngine>, metrics: Arc<RpcMetrics>) -> Self {
        Self {
            engine,
            metrics,
            ui: ChannelUi::new(256),
            me: None,
            keys: None,
            cancel: CancelToken::never(),
        }
    }

    pub fn with_me(mut self, me: Identity) -> Self {
        self.me = Some(me);
        self
    }

    pub fn with_keys(mut self, keys: Arc<dyn SecretKeySource>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn context(&self) -> RunContext<'_> {
        let mut ctx = RunContext::new(&self.ui).with_cancel(self.cancel.clone());
        if let Some(me) = &self.me {
            ctx = ctx.with_me(me);
        }
        if let Some(keys) = &self.keys {
            ctx = ctx.with_keys(keys.as_ref());
        }
        ctx
    }
}

pub fn router(state: Arc<RpcState>) -> Router {
    Router::new()
        .route("/v1/identify", post(identify))
        .route("/v1/identify_group", post(identify_group))
        .route("/v1/progress", get(progress))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn identify(
    State(state): State<Arc<RpcState>>,
    Json(args): Json<IdentifyArgs>,
) -> Result<Json<IdentifyReply>, RpcError> {
    let started = Instant::now();
    let result = async {
        check_version(args.version)?;
        let mut request = IdentifyRequest::new(args.assertion, args.behavior).with_track(args.track);
        if let Some(session_id) = args.session_id {
            request = request.with_session_id(session_id);
        }
        Ok::<_, RpcError>(state.engine.run(request, &state.context()).await?)
    }
    .await;

    match result {
        Ok(outcome) => {
            state.metrics.record_outcome(&outcome, started.elapsed());
            Ok(Json(IdentifyReply {
                version: API_VERSION,
                outcome,
            }))
        }
        Err(e) => {
            state.metrics.record_error(&e);
            Err(e)
        }
    }
}

async fn identify_group(
    State(state): State<Arc<RpcState>>,
    Json(args): Json<GroupArgs>,
) -> Result<Json<GroupReply>, RpcError> {
    let started = Instant::now();
    let result = async {
        check_version(args.version)?;
        let ctx = state.context();
        Ok::<_, RpcError>(
            state
                .engine
                .identify_group(&args.assertions, args.behavior, &ctx)
                .await?,
        )
    }
    .await;

    match result {
        Ok(outcome) => {
            state.metrics.record_group(&outcome, started.elapsed());
            Ok(Json(GroupReply {
                version: API_VERSION,
                outcome,
            }))
        }
        Err(e) => {
            state.metrics.record_error(&e);
            Err(e)
        }
    }
}

async fn metrics(State(state): State<Arc<RpcState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => text.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Optional filter for the progress socket.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProgressFilter {
    /// Only forward events of this run.
    pub session_id: Option<String>,
}

impl ProgressFilter {
    pub fn matches(&self, event: &ProgressEvent) -> bool {
        self.session_id
            .as_deref()
            .map_or(true, |id| id == event.session_id)
    }
}

async fn progress(
    ws: WebSocketUpgrade,
    Query(filter): Query<ProgressFilter>,
    State(state): State<Arc<RpcState>>,
) -> impl IntoResponse {
    let rx = state.ui.subscribe();
    ws.on_upgrade(move |socket| forward_progress(socket, rx, filter))
}

/// Stream progress events to one client until either side goes away.
async fn forward_progress(
    socket: WebSocket,
    mut rx: broadcast::Receiver<ProgressEvent>,
    filter: ProgressFilter,
) {
    let (mut sender, mut receiver) = socket.split();
    debug!(session_id = ?filter.session_id, "progress client connected");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) if filter.matches(&event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "unserialisable progress event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "progress client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Ping(data))) => {
                    if sender.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("progress client disconnected");
}

pub struct RpcServer {
    pub port: u16,
    pub state: Arc<RpcState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<RpcState>) -> Self {
        Self { port, state }
    }

    /// Bind to the configured port and serve until `shutdown` resolves.
    pub async fn start(&self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<(), RpcError> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "rpc server listening");
        }
        axum::serve(listener, router(Arc::clone(&self.state)))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("rpc server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackid_identify::{IdentifyState, ProgressKind};

    #[test]
    fn filter_matches_session() {
        let event = ProgressEvent {
            session_id: "a-1".into(),
            kind: ProgressKind::StateChanged {
                state: IdentifyState::Done,
            },
        };
        assert!(ProgressFilter::default().matches(&event));
        assert!(ProgressFilter { session_id: Some("a-1".into()) }.matches(&event));
        assert!(!ProgressFilter { session_id: Some("b-2".into()) }.matches(&event));
    }
}
