//! Configuration for the reservation report tool

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use reservation_details::financial::DEFAULT_CURRENCY;

/// Default request timeout against the reporting API.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub display: DisplaySection,
}

/// `[api]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    /// Base URL of the reporting API, without trailing `/api`
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sent as `x-api-key`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[display]` section
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySection {
    /// Currency used when a record carries none
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (timeout_secs must be a number)"
        })
    }

    /// Apply command-line / environment overrides on top of the file values.
    pub fn with_overrides(mut self, base_url: Option<String>, api_key: Option<String>) -> Self {
        if base_url.is_some() {
            self.api.base_url = base_url;
        }
        if api_key.is_some() {
            self.api.api_key = api_key;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ReportConfig::parse("").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.base_url, None);
        assert_eq!(config.display.currency, "EUR");
    }

    #[test]
    fn test_full_config() {
        let config = ReportConfig::parse(
            r#"
            [api]
            base_url = "https://reports.example.com"
            api_key = "secret"
            timeout_secs = 5

            [display]
            currency = "USD"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://reports.example.com"));
        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.display.currency, "USD");
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = ReportConfig::parse("[api]\napi_key = \"k\"\n").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.display.currency, "EUR");
    }

    #[test]
    fn test_bad_types_are_rejected() {
        assert!(ReportConfig::parse("[api]\ntimeout_secs = \"soon\"\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\ncurrency = \"GBP\"").unwrap();
        let config = ReportConfig::load(file.path()).unwrap();
        assert_eq!(config.display.currency, "GBP");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = ReportConfig::parse("[api]\nbase_url = \"http://file\"\napi_key = \"file\"\n")
            .unwrap()
            .with_overrides(Some("http://cli".into()), None);
        assert_eq!(config.api.base_url.as_deref(), Some("http://cli"));
        assert_eq!(config.api.api_key.as_deref(), Some("file"));
    }
}
