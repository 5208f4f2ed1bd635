//! Configuration module for the exporter.
//!
//! Values are read once at startup from the environment (optionally seeded
//! from a `.env` file), organized by concern: Web, Status and Logging. The
//! command line overrides whatever the environment provides.

mod logging_config;
mod status_config;
mod web_config;

pub use logging_config::{LogFormat, LogLevel, LoggingEnvConfig};
pub use status_config::{DEFAULT_STATUS_CMD, StatusEnvConfig, StatusFlag};
pub use web_config::{
    DEFAULT_LISTEN_ADDRESS, DEFAULT_METRICS_PATH, WebEnvConfig, normalize_metrics_path,
    parse_listen_address,
};

use anyhow::{Context, Result};
use std::env;

/// Main exporter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub web: WebEnvConfig,
    pub status: StatusEnvConfig,
    pub logging: LoggingEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            web: WebEnvConfig::from_lookup(&lookup).context("Invalid web configuration")?,
            status: StatusEnvConfig::from_lookup(&lookup)
                .context("Invalid status configuration")?,
            logging: LoggingEnvConfig::from_lookup(&lookup)
                .context("Invalid logging configuration")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).expect("Should parse with defaults");
        assert_eq!(config.web.metrics_path, "/metrics");
        assert_eq!(config.web.listen_address.port(), 10036);
        assert_eq!(config.status.command, "vpn-user-portal-status");
        assert!(config.status.flags.is_empty());
        assert!(!config.status.strict);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Logfmt);
    }

    #[test]
    fn test_config_from_variables() {
        let vars = HashMap::from([
            ("EDUVPN_EXPORTER_LISTEN_ADDRESS", "127.0.0.1:9999"),
            ("EDUVPN_EXPORTER_METRICS_PATH", "eduvpn"),
            ("EDUVPN_EXPORTER_STATUS_FLAGS", "connections"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.web.listen_address.to_string(), "127.0.0.1:9999");
        assert_eq!(config.web.metrics_path, "/eduvpn");
        assert_eq!(config.status.flags, vec![StatusFlag::Connections]);
    }

    #[test]
    fn test_invalid_variable_names_its_section() {
        let err = Config::from_lookup(|key| {
            (key == "EDUVPN_EXPORTER_LISTEN_ADDRESS").then(|| "nowhere".to_string())
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid web configuration"));
    }
}
