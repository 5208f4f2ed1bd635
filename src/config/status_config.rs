//! Status command configuration.

use anyhow::Result;
use std::str::FromStr;

pub const DEFAULT_STATUS_CMD: &str = "vpn-user-portal-status";

/// Extra flags understood by `vpn-user-portal-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusFlag {
    /// Include the per-connection list
    Connections,
    /// Include all profiles
    All,
}

impl StatusFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFlag::Connections => "connections",
            StatusFlag::All => "all",
        }
    }

    /// Command-line form, e.g. `--connections`.
    pub fn as_arg(&self) -> String {
        format!("--{}", self.as_str())
    }
}

impl FromStr for StatusFlag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "connections" => Ok(StatusFlag::Connections),
            "all" => Ok(StatusFlag::All),
            _ => anyhow::bail!("Invalid status flag: {}. Must be 'connections' or 'all'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEnvConfig {
    pub command: String,
    pub flags: Vec<StatusFlag>,
    pub strict: bool,
}

impl Default for StatusEnvConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_STATUS_CMD.to_string(),
            flags: Vec::new(),
            strict: false,
        }
    }
}

impl StatusEnvConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let flags = match lookup("EDUVPN_EXPORTER_STATUS_FLAGS") {
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(StatusFlag::from_str)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let strict = match lookup("EDUVPN_EXPORTER_STATUS_STRICT") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                anyhow::anyhow!("Invalid EDUVPN_EXPORTER_STATUS_STRICT: {}. Must be 'true' or 'false'", raw)
            })?,
            None => false,
        };

        Ok(Self {
            command: lookup("EDUVPN_EXPORTER_STATUS_CMD")
                .unwrap_or_else(|| DEFAULT_STATUS_CMD.to_string()),
            flags,
            strict,
        })
    }
}
