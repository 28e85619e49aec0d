//! HTTP server for the identify engine.
//!
//! Provides endpoints for:
//! - Single-user identify, optionally tracking (`POST /v1/identify`)
//! - Multi-user identify (`POST /v1/identify_group`)
//! - Live progress of every run (`GET /v1/progress`, WebSocket)
//! - Prometheus metrics (`GET /metrics`)

pub mod api;
pub mod error;
pub mod metrics;
pub mod progress;
pub mod server;

pub use api::{
    ErrorBody, ErrorReply, GroupArgs, GroupReply, IdentifyArgs, IdentifyReply, API_VERSION,
};
pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use progress::ChannelUi;
pub use server::{router, RpcServer, RpcState};
