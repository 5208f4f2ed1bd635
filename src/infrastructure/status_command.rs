//! Runs `vpn-user-portal-status` and captures its JSON output.

use crate::config::StatusFlag;
use crate::domain::errors::ScrapeError;
use crate::domain::ports::StatusSource;
use std::process::Command;
use tracing::debug;

/// Longest stderr excerpt kept in an error.
const STDERR_PREVIEW_BYTES: usize = 512;

/// Invokes the status command as `<command> --json [--flag]*`.
///
/// No timeout is applied; a hung command blocks the scrape until it exits.
#[derive(Debug, Clone)]
pub struct StatusCommand {
    command: String,
    flags: Vec<StatusFlag>,
}

impl StatusCommand {
    pub fn new(command: impl Into<String>, flags: Vec<StatusFlag>) -> Self {
        Self {
            command: command.into(),
            flags,
        }
    }

    /// Arguments passed to the command, `--json` first.
    pub fn args(&self) -> Vec<String> {
        std::iter::once("--json".to_string())
            .chain(self.flags.iter().map(StatusFlag::as_arg))
            .collect()
    }
}

impl StatusSource for StatusCommand {
    fn fetch(&self) -> Result<Vec<u8>, ScrapeError> {
        let args = self.args();
        debug!(command = %self.command, ?args, "Running status command");

        let output = Command::new(&self.command).args(&args).output().map_err(|source| {
            ScrapeError::CommandInvocation {
                command: self.command.clone(),
                source,
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScrapeError::CommandFailed {
                command: self.command.clone(),
                status: output.status,
                stderr: truncate(stderr.trim(), STDERR_PREVIEW_BYTES).to_string(),
            });
        }

        Ok(output.stdout)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.command, self.args().join(" "))
    }
}

/// Cuts `text` to at most `max` bytes on a char boundary.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_always_start_with_json() {
        let command = StatusCommand::new("vpn-user-portal-status", vec![]);
        assert_eq!(command.args(), vec!["--json"]);

        let command = StatusCommand::new(
            "vpn-user-portal-status",
            vec![StatusFlag::Connections, StatusFlag::All],
        );
        assert_eq!(command.args(), vec!["--json", "--connections", "--all"]);
        assert_eq!(
            command.describe(),
            "vpn-user-portal-status --json --connections --all"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate("aé", 2), "a");
    }
}
