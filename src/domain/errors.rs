use std::process::ExitStatus;
use thiserror::Error;

/// Reasons a scrape cycle fails.
///
/// Every variant is fatal to the cycle and looks the same to Prometheus
/// (`up` = 0, `scrape_failures_total` + 1). The split only matters for logs.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to run status command {command}: {source}")]
    CommandInvocation {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Status command {command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Invalid JSON output from status command: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error("Status output does not match the expected schema: {reason}")]
    SchemaDecode { reason: String },
}

impl ScrapeError {
    /// Short, stable label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::CommandInvocation { .. } | ScrapeError::CommandFailed { .. } => "command",
            ScrapeError::MalformedOutput(_) => "malformed",
            ScrapeError::SchemaDecode { .. } => "schema",
        }
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::SchemaDecode {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let io = ScrapeError::CommandInvocation {
            command: "vpn-user-portal-status".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.kind(), "command");
        assert!(io.to_string().contains("vpn-user-portal-status"));

        let malformed = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert_eq!(ScrapeError::MalformedOutput(malformed).kind(), "malformed");

        let schema = serde_json::from_str::<Vec<u64>>("{}").unwrap_err();
        assert_eq!(ScrapeError::from(schema).kind(), "schema");
    }
}
