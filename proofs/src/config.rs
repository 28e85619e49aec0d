//! Settings for the built-in checkers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Transport-level timeout for each HTTP request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// DNS-over-HTTPS JSON endpoint used for DNS proofs.
    #[serde(default = "default_doh_endpoint")]
    pub doh_endpoint: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_doh_endpoint() -> String {
    "https://cloudflare-dns.com/dns-query".to_string()
}

fn default_user_agent() -> String {
    format!("trackid/{}", env!("CARGO_PKG_VERSION"))
}

impl CheckerConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Build the shared HTTP client every network checker uses.
    pub fn http_client(&self) -> Result<reqwest::Client, crate::ProofError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout())
            .connect_timeout(Duration::from_secs(5))
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| crate::ProofError::Client(e.to_string()))
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout_secs(),
            doh_endpoint: default_doh_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}
