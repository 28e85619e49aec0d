//! DNS proofs, checked through a DNS-over-HTTPS JSON resolver.
//!
//! The domain owner publishes `trackid-site-verification=<sig_id>` in a TXT
//! record at `_trackid.<domain>`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::checker::ProofChecker;
use crate::error::ProofError;
use crate::prospect::ProofProspect;

/// Prefix of the TXT record value that carries a sig id.
pub const TXT_PREFIX: &str = "trackid-site-verification=";

/// DNS RCODEs from the resolver's `Status` field.
const RCODE_NOERROR: u32 = 0;
const RCODE_SERVFAIL: u32 = 2;
const RCODE_NXDOMAIN: u32 = 3;

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    data: String,
}

pub struct DnsTxtChecker {
    endpoint: String,
    http_client: reqwest::Client,
}

impl DnsTxtChecker {
    pub fn new(endpoint: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            http_client,
        }
    }

    fn record_name(domain: &str) -> String {
        format!("_trackid.{}", domain.trim_end_matches('.'))
    }
}

/// Whether any TXT answer carries `sig_id`. Resolvers return TXT data quoted,
/// sometimes split into several quoted strings.
fn answers_contain(answers: &[DohAnswer], sig_id: &str) -> bool {
    let expected = format!("{TXT_PREFIX}{sig_id}");
    answers.iter().any(|a| {
        let joined: String = a.data.split('"').filter(|s| !s.trim().is_empty()).collect();
        joined.trim() == expected
    })
}

#[async_trait]
impl ProofChecker for DnsTxtChecker {
    fn name(&self) -> &str {
        "dns-txt"
    }

    async fn check(&self, prospect: &ProofProspect) -> Result<(), ProofError> {
        let domain = &prospect.key().value;
        if !prospect.statement.remote.eq_ignore_ascii_case(domain) {
            return Err(ProofError::RemoteMismatch(format!(
                "{} is not {domain}",
                prospect.statement.remote
            )));
        }

        let name = Self::record_name(domain);
        debug!(%name, "querying TXT record");
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("name", name.as_str()), ("type", "TXT")])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProofError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ProofError::BadStatus(status.as_u16()));
        }

        let doh: DohResponse = response
            .json()
            .await
            .map_err(|e| ProofError::InvalidResponse(format!("resolver reply: {e}")))?;

        match doh.status {
            RCODE_NOERROR if answers_contain(&doh.answer, &prospect.statement.sig_id) => Ok(()),
            RCODE_NOERROR | RCODE_NXDOMAIN => Err(ProofError::EvidenceMissing),
            RCODE_SERVFAIL => Err(ProofError::Unreachable(format!("SERVFAIL for {name}"))),
            other => Err(ProofError::InvalidResponse(format!("rcode {other} for {name}"))),
        }
    }
}
