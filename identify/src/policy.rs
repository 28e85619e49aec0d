//! Identify behavior: which calling context a run serves, and the rules that come with it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Calling context of an identify run. Closed set; codes are stable on the wire.
///
/// Serialized as its SCREAMING_SNAKE_CASE name. Unknown names decode as `Unset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IdentifyBehavior {
    #[default]
    Unset,
    ChatCli,
    ChatGui,
    ChatGuiStrict,
    KbfsRekey,
    KbfsQr,
    ChatSkip,
    Saltpack,
    Cli,
    Gui,
    DefaultKbfs,
    Pages,
}

/// Rules for one calling context. Read-only during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IdentifyPolicy {
    /// A recent clean outcome for the same target may be reused.
    pub allow_cache: bool,
    /// Revoked or permanently failed proofs make the run `Failed` instead of `HasBreaks`.
    pub escalate_revoked_to_failure: bool,
    /// A tracking statement may be signed without asking the user.
    pub allow_unattended_signing: bool,
    /// Per-proof timeout.
    pub max_proof_timeout: Duration,
}

impl IdentifyBehavior {
    pub const ALL: [IdentifyBehavior; 12] = [
        Self::Unset,
        Self::ChatCli,
        Self::ChatGui,
        Self::ChatGuiStrict,
        Self::KbfsRekey,
        Self::KbfsQr,
        Self::ChatSkip,
        Self::Saltpack,
        Self::Cli,
        Self::Gui,
        Self::DefaultKbfs,
        Self::Pages,
    ];

    pub fn code(self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::ChatCli => 1,
            Self::ChatGui => 2,
            Self::ChatGuiStrict => 3,
            Self::KbfsRekey => 4,
            Self::KbfsQr => 5,
            Self::ChatSkip => 6,
            Self::Saltpack => 7,
            Self::Cli => 8,
            Self::Gui => 9,
            Self::DefaultKbfs => 10,
            Self::Pages => 11,
        }
    }

    /// Unknown codes fall back to `Unset`.
    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|b| b.code() == code)
            .unwrap_or(Self::Unset)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "UNSET",
            Self::ChatCli => "CHAT_CLI",
            Self::ChatGui => "CHAT_GUI",
            Self::ChatGuiStrict => "CHAT_GUI_STRICT",
            Self::KbfsRekey => "KBFS_REKEY",
            Self::KbfsQr => "KBFS_QR",
            Self::ChatSkip => "CHAT_SKIP",
            Self::Saltpack => "SALTPACK",
            Self::Cli => "CLI",
            Self::Gui => "GUI",
            Self::DefaultKbfs => "DEFAULT_KBFS",
            Self::Pages => "PAGES",
        }
    }

    /// The policy row for this context.
    pub fn policy(self) -> IdentifyPolicy {
        let (allow_cache, escalate, unattended, timeout_secs) = match self {
            Self::Unset => (false, true, false, 10),
            Self::Cli => (false, true, false, 15),
            Self::Gui => (false, false, false, 15),
            Self::ChatCli => (true, true, false, 10),
            Self::ChatGui => (true, false, false, 10),
            Self::ChatGuiStrict => (true, true, false, 10),
            Self::ChatSkip => (true, false, true, 5),
            Self::KbfsRekey => (true, false, true, 10),
            Self::KbfsQr => (true, false, true, 10),
            Self::DefaultKbfs => (true, false, false, 10),
            Self::Saltpack => (false, true, false, 15),
            Self::Pages => (true, false, true, 5),
        };
        IdentifyPolicy {
            allow_cache,
            escalate_revoked_to_failure: escalate,
            allow_unattended_signing: unattended,
            max_proof_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl From<String> for IdentifyBehavior {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl From<IdentifyBehavior> for String {
    fn from(b: IdentifyBehavior) -> Self {
        b.as_str().to_string()
    }
}

impl FromStr for IdentifyBehavior {
    type Err = String;

    /// Accepts the wire name in any case, with `-` or `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == wanted)
            .ok_or_else(|| format!("unknown identify behavior: {s}"))
    }
}

impl fmt::Display for IdentifyBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
