//! HTTP listener configuration.

use anyhow::{Context, Result, bail};
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_ADDRESS: &str = ":10036";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebEnvConfig {
    pub listen_address: SocketAddr,
    pub metrics_path: String,
}

impl Default for WebEnvConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([0, 0, 0, 0], 10036)),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl WebEnvConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_address = lookup("EDUVPN_EXPORTER_LISTEN_ADDRESS")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string());
        let metrics_path = lookup("EDUVPN_EXPORTER_METRICS_PATH")
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());

        Ok(Self {
            listen_address: parse_listen_address(&listen_address)?,
            metrics_path: normalize_metrics_path(&metrics_path)?,
        })
    }
}

/// Parses `host:port`, accepting the bare `:port` form for all interfaces.
pub fn parse_listen_address(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    let candidate = match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => value.to_string(),
    };
    candidate
        .parse()
        .with_context(|| format!("Invalid listen address: {value}"))
}

/// Prepends `/` when missing. The root path is reserved for the landing page
/// and route captures are rejected.
pub fn normalize_metrics_path(value: &str) -> Result<String> {
    let value = value.trim();
    let path = if value.starts_with('/') {
        value.to_string()
    } else {
        format!("/{value}")
    };
    if path == "/" {
        bail!("Metrics path must not be the root path");
    }
    if path.contains(['{', '}']) || path.split('/').any(|seg| seg.starts_with([':', '*'])) {
        bail!("Metrics path must be a literal path: {path}");
    }
    Ok(path)
}
