//! Log output configuration.

use anyhow::Result;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be 'debug', 'info', 'warn', or 'error'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Logfmt,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logfmt" => Ok(LogFormat::Logfmt),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format: {}. Must be 'logfmt' or 'json'", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingEnvConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LoggingEnvConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            level: lookup("EDUVPN_EXPORTER_LOG_LEVEL")
                .map(|v| v.parse::<LogLevel>())
                .transpose()?
                .unwrap_or_default(),
            format: lookup("EDUVPN_EXPORTER_LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_parsing() {
        let config = LoggingEnvConfig::from_lookup(|key| match key {
            "EDUVPN_EXPORTER_LOG_LEVEL" => Some("DEBUG".to_string()),
            "EDUVPN_EXPORTER_LOG_FORMAT" => Some("json".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);

        assert!(LoggingEnvConfig::from_lookup(|_| Some("verbose".to_string())).is_err());
    }
}
