//! Configuration for the exchange client
//!
//! This module handles configuration loading from TOML files and provides
//! structured configuration types. An `Exchange` instance is constructed
//! from an explicit `Config` value, so independently-configured instances
//! can coexist in one process.

use serde::{Deserialize, Serialize};

use crate::errors::{ExchangeError, ExchangeResult};

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger node configuration
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger node hostnames (no scheme, no port)
    pub hosts: Vec<String>,

    /// RPC port shared by all hosts
    pub port: u16,

    /// Use HTTPS instead of HTTP
    #[serde(default = "default_https")]
    pub https: bool,

    /// Sequence-conflict retries per submission (total attempts = retry + 1)
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_https() -> bool {
    true
}
fn default_retry() -> u32 {
    3
}
fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration before building a client from it
    pub fn validate(&self) -> ExchangeResult<()> {
        if self.ledger.hosts.is_empty() {
            return Err(ExchangeError::Configuration(
                "at least one ledger host is required".to_string(),
            ));
        }
        if self.ledger.hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(ExchangeError::Configuration(
                "ledger host must not be empty".to_string(),
            ));
        }
        if self.ledger.port == 0 {
            return Err(ExchangeError::Configuration(
                "ledger port must be non-zero".to_string(),
            ));
        }
        if self.ledger.timeout_secs == 0 {
            return Err(ExchangeError::Configuration(
                "request timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Configuration for a single node, defaults elsewhere
    pub fn single_host(host: &str, port: u16, https: bool) -> Self {
        Self {
            ledger: LedgerConfig {
                hosts: vec![host.to_string()],
                port,
                https,
                retry: default_retry(),
                timeout_secs: default_timeout(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [ledger]
            hosts = ["node1.example.com", "node2.example.com"]
            port = 5050
            "#,
        )
        .unwrap();

        assert_eq!(config.ledger.hosts.len(), 2);
        assert_eq!(config.ledger.port, 5050);
        assert!(config.ledger.https);
        assert_eq!(config.ledger.retry, 3);
        assert_eq!(config.ledger.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [ledger]
            hosts = ["localhost"]
            port = 5050
            https = false
            retry = 0
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert!(!config.ledger.https);
        assert_eq!(config.ledger.retry, 0);
        assert_eq!(config.ledger.timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_config() {
        let mut config = Config::single_host("node1", 5050, true);
        config.ledger.hosts.clear();
        assert!(matches!(
            config.validate(),
            Err(ExchangeError::Configuration(_))
        ));

        let mut config = Config::single_host("node1", 5050, true);
        config.ledger.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::single_host("  ", 5050, true);
        assert!(config.validate().is_err());
        config.ledger.hosts = vec!["node1".to_string()];
        config.ledger.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
