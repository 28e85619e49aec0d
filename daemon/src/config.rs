//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trackid_identify::EngineConfig;
use trackid_proofs::CheckerConfig;
use trackid_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the `trackid` binary.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; CLI flags
/// override individual fields afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Base URL of the identity directory.
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Hex-encoded signing key, needed for `track` and for tracking over RPC.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Username of the identity this process acts as.
    #[serde(default)]
    pub me: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub checkers: CheckerConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_directory_url() -> String {
    "http://127.0.0.1:7070".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rpc_port() -> u16 {
    7077
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("DaemonConfig is always serializable to TOML")
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            directory_url: default_directory_url(),
            key_file: None,
            me: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            rpc_port: default_rpc_port(),
            engine: EngineConfig::default(),
            checkers: CheckerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let mut config = DaemonConfig::default();
        config.me = Some("alice".into());
        config.key_file = Some(PathBuf::from("/keys/alice.hex"));
        let parsed = DaemonConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.engine.concurrency_limit, 8);
    }

    #[test]
    fn nested_sections_override() {
        let toml = r#"
            me = "alice"
            log_format = "json"

            [engine]
            concurrency_limit = 2

            [checkers]
            http_timeout_secs = 3
        "#;
        let config = DaemonConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.engine.concurrency_limit, 2);
        assert_eq!(config.engine.cache_ttl_secs, 300);
        assert_eq!(config.checkers.http_timeout_secs, 3);
        assert_eq!(config.rpc_port, 7077);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_port = 9999").unwrap();
        let config = DaemonConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.rpc_port, 9999);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = DaemonConfig::from_toml_file(Path::new("/nonexistent/trackid.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(matches!(
            DaemonConfig::from_toml_str("log_format = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
