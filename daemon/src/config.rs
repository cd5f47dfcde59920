//! Daemon configuration with TOML file support.

use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the `ballot` CLI.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; every field
/// has a default so an empty file is valid. Command-line flags override it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Wallet API JSON-RPC endpoint.
    #[serde(default = "default_wallet_api_url")]
    pub wallet_api_url: String,

    /// Id of the voting contract.
    #[serde(default)]
    pub contract_id: String,

    /// Contract shader the wallet runs for invocations, if it needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_file: Option<String>,

    /// Directory holding the local pending-vote store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_wallet_api_url() -> String {
    "http://127.0.0.1:10000/api/wallet".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ballot_data")
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

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

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        self.log_format.parse().map_err(ConfigError::Invalid)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Check the settings every command needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contract_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "contract_id is required (--contract-id or BALLOT_CONTRACT_ID)".into(),
            ));
        }
        if self.wallet_api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("wallet_api_url must not be empty".into()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_secs must be at least 1".into(),
            ));
        }
        self.log_format()?;
        Ok(())
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            wallet_api_url: default_wallet_api_url(),
            contract_id: String::new(),
            contract_file: None,
            data_dir: default_data_dir(),
            refresh_interval_secs: default_refresh_interval_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig {
            contract_id: "abc".into(),
            ..Default::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
        assert!(config.contract_id.is_empty());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            contract_id = "f00d"
            refresh_interval_secs = 30
            log_format = "json"
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.contract_id, "f00d");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_contract_id_is_invalid() {
        let err = DaemonConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_interval_and_bad_format_are_invalid() {
        let mut config = DaemonConfig {
            contract_id: "c".into(),
            refresh_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.refresh_interval_secs = 1;
        config.log_format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = DaemonConfig::from_toml_file(Path::new("/nonexistent/ballot.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ballot.toml");
        std::fs::write(&path, "contract_id = \"cid\"\n").unwrap();
        let config = DaemonConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.contract_id, "cid");
    }
}
