//! Checker for proofs posted on a web service (social posts, gists, site files).
//!
//! The remote URL must live on one of the service's hosts, and the fetched body
//! must contain the statement's sig id.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;
use trackid_types::ProofType;

use crate::checker::ProofChecker;
use crate::error::ProofError;
use crate::prospect::ProofProspect;

/// Where a hosted proof is allowed to live.
#[derive(Clone, Debug)]
enum HostRule {
    /// One of these hosts, with the path starting with `/<value>/`.
    UserPath(&'static [&'static str]),
    /// One of these hosts, any path.
    AnyPath(&'static [&'static str]),
    /// The host must equal the proof value (a domain the user controls).
    OwnDomain,
}

/// Fetches a hosted proof and looks for the signature id in the body.
pub struct HostedProofChecker {
    name: String,
    rule: HostRule,
    http_client: reqwest::Client,
}

impl HostedProofChecker {
    /// Build a checker for one of the hosted proof types. Returns `None` for
    /// types whose evidence is not a web page.
    pub fn for_type(proof_type: &ProofType, http_client: reqwest::Client) -> Option<Self> {
        let rule = match proof_type {
            ProofType::Twitter => HostRule::UserPath(&["twitter.com", "mobile.twitter.com", "x.com"]),
            ProofType::Github => HostRule::UserPath(&["gist.github.com", "github.com"]),
            ProofType::Reddit => {
                HostRule::AnyPath(&["reddit.com", "www.reddit.com", "old.reddit.com"])
            }
            ProofType::HackerNews => HostRule::AnyPath(&["news.ycombinator.com"]),
            ProofType::Web => HostRule::OwnDomain,
            _ => return None,
        };
        Some(Self {
            name: format!("hosted:{proof_type}"),
            rule,
            http_client,
        })
    }

    fn check_location(&self, prospect: &ProofProspect) -> Result<Url, ProofError> {
        let remote = &prospect.statement.remote;
        let url = Url::parse(remote)
            .map_err(|e| ProofError::RemoteMismatch(format!("{remote}: {e}")))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(ProofError::RemoteMismatch(format!(
                "{remote}: unsupported scheme"
            )));
        }
        let host = url
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ProofError::RemoteMismatch(format!("{remote}: no host")))?;
        let value = &prospect.key().value;

        let ok = match &self.rule {
            HostRule::UserPath(hosts) => {
                let prefix = format!("/{}/", value.to_ascii_lowercase());
                hosts.iter().any(|h| *h == host)
                    && url.path().to_ascii_lowercase().starts_with(&prefix)
            }
            HostRule::AnyPath(hosts) => hosts.iter().any(|h| *h == host),
            HostRule::OwnDomain => host == value.to_ascii_lowercase(),
        };
        if ok {
            Ok(url)
        } else {
            Err(ProofError::RemoteMismatch(format!(
                "{remote} is not a location for {}",
                prospect.key()
            )))
        }
    }
}

#[async_trait]
impl ProofChecker for HostedProofChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, prospect: &ProofProspect) -> Result<(), ProofError> {
        let url = self.check_location(prospect)?;
        debug!(proof = %prospect.key(), %url, "fetching hosted proof");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => return Err(ProofError::Deleted),
            s if s.is_server_error() => return Err(ProofError::ServerError(s.as_u16())),
            s if !s.is_success() => return Err(ProofError::BadStatus(s.as_u16())),
            _ => {}
        }

        let body = response.text().await?;
        if body.contains(&prospect.statement.sig_id) {
            Ok(())
        } else {
            Err(ProofError::EvidenceMissing)
        }
    }
}
