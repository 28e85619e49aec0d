//! Versioned request and response records.

use serde::{Deserialize, Serialize};
use trackid_identify::{GroupIdentifyOutcome, IdentifyBehavior, IdentifyOutcome};

use crate::error::RpcError;

/// The only record version this server speaks.
pub const API_VERSION: u32 = 1;

// ── Identify ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentifyArgs {
    pub version: u32,
    pub assertion: String,
    #[serde(default)]
    pub behavior: IdentifyBehavior,
    #[serde(default)]
    pub track: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentifyReply {
    pub version: u32,
    pub outcome: IdentifyOutcome,
}

// ── Group identify ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupArgs {
    pub version: u32,
    pub assertions: Vec<String>,
    #[serde(default)]
    pub behavior: IdentifyBehavior,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupReply {
    pub version: u32,
    pub outcome: GroupIdentifyOutcome,
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub version: u32,
    pub error: ErrorBody,
}

pub(crate) fn check_version(version: u32) -> Result<(), RpcError> {
    if version == API_VERSION {
        Ok(())
    } else {
        Err(RpcError::BadVersion(version))
    }
}
