//! Proof types and the key that identifies one claim.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// The kind of external service a proof binds an identity to.
///
/// Proof tables loaded from a directory may carry types this build does not know
/// about; those are kept as [`ProofType::Other`] so the checker registry can
/// report them instead of dropping them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProofType {
    Twitter,
    Github,
    Reddit,
    HackerNews,
    Dns,
    Web,
    Pgp,
    Other(String),
}

impl ProofType {
    /// All proof types this build understands.
    pub const KNOWN: [ProofType; 7] = [
        ProofType::Twitter,
        ProofType::Github,
        ProofType::Reddit,
        ProofType::HackerNews,
        ProofType::Dns,
        ProofType::Web,
        ProofType::Pgp,
    ];

    /// Map a service name to a known proof type. `http` and `https` are aliases for `web`.
    pub fn from_service(service: &str) -> Option<Self> {
        match service {
            "twitter" => Some(Self::Twitter),
            "github" => Some(Self::Github),
            "reddit" => Some(Self::Reddit),
            "hackernews" => Some(Self::HackerNews),
            "dns" => Some(Self::Dns),
            "web" | "http" | "https" => Some(Self::Web),
            "pgp" => Some(Self::Pgp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Twitter => "twitter",
            Self::Github => "github",
            Self::Reddit => "reddit",
            Self::HackerNews => "hackernews",
            Self::Dns => "dns",
            Self::Web => "web",
            Self::Pgp => "pgp",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether proof values for this type compare case-sensitively.
    pub fn case_sensitive(&self) -> bool {
        matches!(self, Self::HackerNews)
    }
}

impl From<String> for ProofType {
    fn from(s: String) -> Self {
        Self::from_service(&s).unwrap_or(Self::Other(s))
    }
}

impl From<ProofType> for String {
    fn from(t: ProofType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one proof claim: a proof type plus the claimed value on that service
/// (a handle, a domain, a key fingerprint).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProofKey {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub value: String,
}

impl ProofKey {
    /// Build a key, normalising the value's case for case-insensitive services.
    pub fn new(proof_type: ProofType, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = if proof_type.case_sensitive() {
            value
        } else {
            value.to_ascii_lowercase()
        };
        Self { proof_type, value }
    }

    /// Parse `type:value`.
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        let (ty, value) = s
            .split_once(':')
            .ok_or_else(|| TypesError::InvalidProofKey(s.to_string()))?;
        if ty.is_empty() || value.is_empty() {
            return Err(TypesError::InvalidProofKey(s.to_string()));
        }
        Ok(Self::new(ProofType::from(ty.to_ascii_lowercase()), value))
    }
}

impl fmt::Display for ProofKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.proof_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_aliases() {
        assert_eq!(ProofType::from_service("https"), Some(ProofType::Web));
        assert_eq!(ProofType::from_service("http"), Some(ProofType::Web));
        assert_eq!(ProofType::from_service("mastodon"), None);
    }

    #[test]
    fn unknown_type_survives_serde() {
        let t: ProofType = serde_json::from_str("\"mastodon\"").unwrap();
        assert_eq!(t, ProofType::Other("mastodon".into()));
        assert!(!t.is_known());
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"mastodon\"");
    }

    #[test]
    fn key_normalises_case_except_hackernews() {
        assert_eq!(ProofKey::new(ProofType::Twitter, "Bob").value, "bob");
        assert_eq!(ProofKey::new(ProofType::HackerNews, "Bob").value, "Bob");
    }

    #[test]
    fn key_parse_and_display() {
        let key = ProofKey::parse("github:Alice").unwrap();
        assert_eq!(key.to_string(), "github:alice");
        assert!(ProofKey::parse("github").is_err());
        assert!(ProofKey::parse("github:").is_err());
    }

    #[test]
    fn key_serializes_with_type_field() {
        let key = ProofKey::new(ProofType::Dns, "example.com");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"type":"dns","value":"example.com"}"#);
    }
}
