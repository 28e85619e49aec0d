//! RPC error types and their wire codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use trackid_identify::{IdentifyError, ResolveError};

use crate::api::{ErrorBody, ErrorReply, API_VERSION};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("unsupported record version {0}")]
    BadVersion(u32),

    #[error(transparent)]
    Identify(#[from] IdentifyError),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadVersion(_) => "BAD_VERSION",
            Self::Identify(e) => match e {
                IdentifyError::Parse(_) => "PARSE",
                IdentifyError::Resolve(ResolveError::NotFound { .. }) => "NOT_FOUND",
                IdentifyError::Resolve(ResolveError::AssertionMismatch { .. }) => {
                    "ASSERTION_MISMATCH"
                }
                IdentifyError::Resolve(ResolveError::UnknownService { .. }) => "UNKNOWN_SERVICE",
                IdentifyError::SelfIdentify { .. } => "SELF_IDENTIFY",
                IdentifyError::UiUnavailable => "UI_UNAVAILABLE",
                IdentifyError::Cancelled => "CANCELLED",
                IdentifyError::TimedOut { .. } => "TIMED_OUT",
                _ => "INTERNAL",
            },
            Self::Server(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            "BAD_VERSION" | "PARSE" | "ASSERTION_MISMATCH" | "UNKNOWN_SERVICE"
            | "SELF_IDENTIFY" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "UI_UNAVAILABLE" => StatusCode::CONFLICT,
            "CANCELLED" => StatusCode::SERVICE_UNAVAILABLE,
            "TIMED_OUT" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_reply(&self) -> ErrorReply {
        ErrorReply {
            version: API_VERSION,
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_reply())).into_response()
    }
}
