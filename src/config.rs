//! Configuration management for Askdesk
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AskdeskError, Result};
use crate::storage::DEFAULT_MAX_ENTRIES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Askdesk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote answer endpoint settings
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Local conversation history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Remote answer endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Full URL of the query endpoint
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Request timeout (seconds); expiry is reported as a network failure
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint_url() -> String {
    "http://localhost:5000/query".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of conversations kept in the history index
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Titles longer than this many characters are cut and marked
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Delete the records of conversations pushed out of the index
    #[serde(default = "default_cascade_evictions")]
    pub cascade_evictions: bool,

    /// Location of the history database (defaults to the user data dir)
    #[serde(default)]
    pub storage_path: Option<String>,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_title_max_chars() -> usize {
    50
}

fn default_cascade_evictions() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            title_max_chars: default_title_max_chars(),
            cascade_evictions: default_cascade_evictions(),
            storage_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line arguments
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AskdeskError::Config(format!("Failed to read {}: {}", path, e)))?;
        let config: Config = serde_yaml::from_str(&contents)?;
        tracing::debug!("Loaded configuration from {}", path);
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("ASKDESK_ENDPOINT_URL") {
            self.endpoint.url = url;
        }

        if let Ok(timeout) = std::env::var("ASKDESK_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.endpoint.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ASKDESK_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(max_entries) = std::env::var("ASKDESK_MAX_HISTORY") {
            if let Ok(value) = max_entries.parse() {
                self.history.max_entries = value;
            } else {
                tracing::warn!("Invalid ASKDESK_MAX_HISTORY: {}", max_entries);
            }
        }

        if let Ok(max_chars) = std::env::var("ASKDESK_TITLE_MAX_CHARS") {
            if let Ok(value) = max_chars.parse() {
                self.history.title_max_chars = value;
            } else {
                tracing::warn!("Invalid ASKDESK_TITLE_MAX_CHARS: {}", max_chars);
            }
        }

        if let Ok(cascade) = std::env::var("ASKDESK_CASCADE_EVICTIONS") {
            match cascade.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.history.cascade_evictions = true,
                "0" | "false" | "no" | "off" => self.history.cascade_evictions = false,
                _ => tracing::warn!("Invalid ASKDESK_CASCADE_EVICTIONS: {}", cascade),
            }
        }

        if let Ok(path) = std::env::var("ASKDESK_STORAGE_PATH") {
            tracing::debug!(storage_path = %path, "Env override: ASKDESK_STORAGE_PATH");
            self.history.storage_path = Some(path);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            tracing::info!("Using storage path override from CLI: {}", path);
            self.history.storage_path = Some(path.clone());
        }
        if let Some(url) = &cli.endpoint {
            self.endpoint.url = url.clone();
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `AskdeskError::Config` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.trim().is_empty() {
            return Err(AskdeskError::Config("endpoint.url cannot be empty".to_string()).into());
        }

        if !self.endpoint.url.starts_with("http://") && !self.endpoint.url.starts_with("https://")
        {
            return Err(AskdeskError::Config(format!(
                "endpoint.url must start with http:// or https://: {}",
                self.endpoint.url
            ))
            .into());
        }

        if self.endpoint.timeout_seconds == 0 {
            return Err(AskdeskError::Config(
                "endpoint.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.max_entries == 0 {
            return Err(AskdeskError::Config(
                "history.max_entries must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.max_entries > 1000 {
            return Err(AskdeskError::Config(
                "history.max_entries must be less than or equal to 1000".to_string(),
            )
            .into());
        }

        if self.history.title_max_chars == 0 {
            return Err(AskdeskError::Config(
                "history.title_max_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ASKDESK_ENDPOINT_URL",
            "ASKDESK_TIMEOUT_SECONDS",
            "ASKDESK_MAX_HISTORY",
            "ASKDESK_TITLE_MAX_CHARS",
            "ASKDESK_CASCADE_EVICTIONS",
            "ASKDESK_STORAGE_PATH",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.endpoint.url, "http://localhost:5000/query");
        assert_eq!(config.endpoint.timeout_seconds, 30);
        assert_eq!(config.history.max_entries, 20);
        assert_eq!(config.history.title_max_chars, 50);
        assert!(config.history.cascade_evictions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
endpoint:
  url: http://example.test/query
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.endpoint.url, "http://example.test/query");
        assert_eq!(config.endpoint.timeout_seconds, 30);
        assert_eq!(config.history.max_entries, 20);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.endpoint.url = "localhost:5000/query".to_string();
        assert!(config.validate().is_err());

        config.endpoint.url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.endpoint.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.max_entries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.title_max_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_history() {
        let mut config = Config::default();
        config.history.max_entries = 1001;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_entries"));
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        clear_env();
        let cli = Cli::try_parse_from(["askdesk", "history", "list"]).unwrap();
        let config = Config::load("/nonexistent/askdesk.yaml", &cli).unwrap();
        assert_eq!(config.history.max_entries, 20);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "history:\n  max_entries: 5\n  cascade_evictions: false\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from(["askdesk", "history", "list"]).unwrap();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.history.max_entries, 5);
        assert!(!config.history.cascade_evictions);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("ASKDESK_ENDPOINT_URL", "http://other:9000/query");
        std::env::set_var("ASKDESK_TIMEOUT_SECONDS", "5");
        std::env::set_var("ASKDESK_MAX_HISTORY", "not-a-number");
        std::env::set_var("ASKDESK_CASCADE_EVICTIONS", "off");

        let cli = Cli::try_parse_from(["askdesk", "history", "list"]).unwrap();
        let config = Config::load("/nonexistent/askdesk.yaml", &cli).unwrap();

        assert_eq!(config.endpoint.url, "http://other:9000/query");
        assert_eq!(config.endpoint.timeout_seconds, 5);
        assert_eq!(config.history.max_entries, 20);
        assert!(!config.history.cascade_evictions);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("ASKDESK_STORAGE_PATH", "/from/env");

        let cli = Cli::try_parse_from([
            "askdesk",
            "--storage-path",
            "/from/cli",
            "history",
            "list",
        ])
        .unwrap();
        let config = Config::load("/nonexistent/askdesk.yaml", &cli).unwrap();
        assert_eq!(config.history.storage_path.as_deref(), Some("/from/cli"));

        clear_env();
    }
}
