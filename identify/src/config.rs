//! Engine-wide settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum proof checks in flight for one run.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Time allowed for resolution and lookups, added to the policy's proof timeout
    /// to form the whole-run deadline.
    #[serde(default = "default_resolution_budget_secs")]
    pub resolution_budget_secs: u64,

    /// How long a cached clean outcome stays usable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_concurrency_limit() -> usize {
    8
}

fn default_resolution_budget_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl EngineConfig {
    pub fn resolution_budget(&self) -> Duration {
        Duration::from_secs(self.resolution_budget_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            resolution_budget_secs: default_resolution_budget_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"concurrency_limit": 2}"#).unwrap();
        assert_eq!(config.concurrency_limit, 2);
        assert_eq!(config.resolution_budget_secs, 10);
        assert_eq!(config.cache_ttl_secs, 300);
    }
}
