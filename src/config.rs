//! Configuration management
//!
//! The client only needs to know where the two public APIs live. Defaults point
//! at production; a JSON file or environment variables (a `.env` file is
//! honoured) can redirect either base URL, e.g. to a local mock server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Prefix for legacy commands; the command string is appended verbatim
pub const DEFAULT_LEGACY_URL: &str = "https://poloniex.com/public?command=";

/// Host for the `/markets/...` endpoints
pub const DEFAULT_MARKETS_URL: &str = "https://api.poloniex.com";

pub const LEGACY_URL_ENV: &str = "POLONIEX_PUBLIC_URL";
pub const MARKETS_URL_ENV: &str = "POLONIEX_MARKETS_URL";

/// Base URLs for both API flavors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_legacy_url")]
    pub legacy_url: String,
    #[serde(default = "default_markets_url")]
    pub markets_url: String,
}

fn default_legacy_url() -> String {
    DEFAULT_LEGACY_URL.to_string()
}

fn default_markets_url() -> String {
    DEFAULT_MARKETS_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            legacy_url: default_legacy_url(),
            markets_url: default_markets_url(),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `POLONIEX_PUBLIC_URL` / `POLONIEX_MARKETS_URL`
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::default().with_env_overrides()
    }

    /// Load configuration from a JSON file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: ClientConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        dotenv::dotenv().ok();
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(LEGACY_URL_ENV) {
            self.legacy_url = url;
        }
        if let Ok(url) = std::env::var(MARKETS_URL_ENV) {
            self.markets_url = url;
        }
        self
    }

    pub fn with_legacy_url(mut self, url: impl Into<String>) -> Self {
        self.legacy_url = url.into();
        self
    }

    pub fn with_markets_url(mut self, url: impl Into<String>) -> Self {
        self.markets_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.legacy_url, "https://poloniex.com/public?command=");
        assert_eq!(config.markets_url, "https://api.poloniex.com");
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::default()
            .with_legacy_url("http://127.0.0.1:9000/public?command=")
            .with_markets_url("http://127.0.0.1:9000");
        assert_eq!(config.legacy_url, "http://127.0.0.1:9000/public?command=");
        assert_eq!(config.markets_url, "http://127.0.0.1:9000");
    }

    #[test]
    #[serial]
    fn test_partial_json_falls_back_to_defaults() {
        std::env::remove_var(LEGACY_URL_ENV);
        std::env::remove_var(MARKETS_URL_ENV);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"markets_url": "http://localhost:1234"}}"#).unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.legacy_url, DEFAULT_LEGACY_URL);
        assert_eq!(config.markets_url, "http://localhost:1234");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file_and_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"legacy_url": "http://localhost:1111/public?command=", "markets_url": "http://localhost:1234"}}"#
        )
        .unwrap();

        std::env::remove_var(LEGACY_URL_ENV);
        std::env::set_var(MARKETS_URL_ENV, "http://127.0.0.1:9999");
        let from_file = ClientConfig::from_file(file.path());
        let from_env = ClientConfig::from_env();
        std::env::remove_var(MARKETS_URL_ENV);

        let from_file = from_file.unwrap();
        assert_eq!(from_file.legacy_url, "http://localhost:1111/public?command=");
        assert_eq!(from_file.markets_url, "http://127.0.0.1:9999");

        assert_eq!(from_env.legacy_url, DEFAULT_LEGACY_URL);
        assert_eq!(from_env.markets_url, "http://127.0.0.1:9999");
    }

    #[test]
    #[serial]
    fn test_from_env_without_overrides_is_default() {
        std::env::remove_var(LEGACY_URL_ENV);
        std::env::remove_var(MARKETS_URL_ENV);
        assert_eq!(ClientConfig::from_env(), ClientConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ClientConfig::from_file("does/not/exist.json").is_err());
    }
}
