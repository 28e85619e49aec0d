//! Atomic assertion terms.

use serde::{Deserialize, Serialize};
use std::fmt;
use trackid_types::{ProofKey, ProofType};

use crate::error::ParseError;

/// Service implied by a bare term (`alice` means `keybase:alice`).
pub const DEFAULT_SERVICE: &str = "keybase";

/// Service whose value is a stable user id.
pub const UID_SERVICE: &str = "uid";

/// One `service:value` term. Both halves are normalised at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssertionComponent {
    pub service: String,
    pub value: String,
}

/// How a component is looked up during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    /// A username on this system.
    Keybase,
    /// A stable user id.
    Uid,
    /// A proof in some identity's proof table.
    Proof(ProofType),
    /// A syntactically valid service nobody recognises.
    Unknown,
}

impl AssertionComponent {
    /// Parse a single term such as `alice`, `twitter:Bob` or `https://example.com`.
    pub fn parse(term: &str) -> Result<Self, ParseError> {
        let term = term.trim();
        let (service, value) = match term.split_once(':') {
            Some((service, value)) => (service.trim().to_ascii_lowercase(), value.trim()),
            None => (DEFAULT_SERVICE.to_string(), term),
        };

        if service.is_empty() {
            return Err(ParseError::EmptyService { term: term.to_string() });
        }
        if !service
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        {
            return Err(ParseError::InvalidService { service });
        }

        let value = value.trim_start_matches('/');
        if value.is_empty() {
            return Err(ParseError::EmptyValue { term: term.to_string() });
        }
        if value.chars().any(char::is_whitespace) {
            return Err(ParseError::InvalidValue { term: term.to_string() });
        }

        let service = match service.as_str() {
            "http" | "https" => "web".to_string(),
            _ => service,
        };
        let value = if service == "hackernews" {
            value.to_string()
        } else {
            value.to_ascii_lowercase()
        };
        Ok(Self { service, value })
    }

    pub fn kind(&self) -> ComponentKind {
        match self.service.as_str() {
            DEFAULT_SERVICE => ComponentKind::Keybase,
            UID_SERVICE => ComponentKind::Uid,
            other => ProofType::from_service(other)
                .map(ComponentKind::Proof)
                .unwrap_or(ComponentKind::Unknown),
        }
    }

    /// The proof this component asserts, for proof-backed services.
    pub fn proof_key(&self) -> Option<ProofKey> {
        match self.kind() {
            ComponentKind::Proof(t) => Some(ProofKey::new(t, self.value.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for AssertionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.service == DEFAULT_SERVICE && !self.value.contains(':') {
            f.write_str(&self.value)
        } else {
            write!(f, "{}:{}", self.service, self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_term_is_keybase() {
        let c = AssertionComponent::parse("Alice").unwrap();
        assert_eq!(c.service, "keybase");
        assert_eq!(c.value, "alice");
        assert_eq!(c.kind(), ComponentKind::Keybase);
        assert_eq!(c.to_string(), "alice");
    }

    #[test]
    fn url_style_web_term() {
        let c = AssertionComponent::parse("https://Example.com").unwrap();
        assert_eq!(c.service, "web");
        assert_eq!(c.value, "example.com");
        assert_eq!(c.kind(), ComponentKind::Proof(ProofType::Web));
    }

    #[test]
    fn keybase_value_with_colon_renders_explicitly() {
        let c = AssertionComponent::parse("keybase:a:b").unwrap();
        assert_eq!(c.to_string(), "keybase:a:b");
        assert_eq!(AssertionComponent::parse(&c.to_string()).unwrap(), c);
    }

    #[test]
    fn hackernews_keeps_case() {
        let c = AssertionComponent::parse("HackerNews:PG").unwrap();
        assert_eq!(c.service, "hackernews");
        assert_eq!(c.value, "PG");
    }

    #[test]
    fn unknown_service_is_syntactically_fine() {
        let c = AssertionComponent::parse("mastodon:bob").unwrap();
        assert_eq!(c.kind(), ComponentKind::Unknown);
        assert!(c.proof_key().is_none());
    }

    #[test]
    fn rejects_missing_parts() {
        assert!(matches!(
            AssertionComponent::parse(":bob"),
            Err(ParseError::EmptyService { .. })
        ));
        assert!(matches!(
            AssertionComponent::parse("twitter:"),
            Err(ParseError::EmptyValue { .. })
        ));
        assert!(matches!(
            AssertionComponent::parse("dns://"),
            Err(ParseError::EmptyValue { .. })
        ));
    }

    #[test]
    fn rejects_bad_service_and_value() {
        assert!(matches!(
            AssertionComponent::parse("twit ter:bob"),
            Err(ParseError::InvalidService { .. })
        ));
        assert!(matches!(
            AssertionComponent::parse("twitter:bo b"),
            Err(ParseError::InvalidValue { .. })
        ));
    }
}
