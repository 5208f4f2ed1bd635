//! eduVPN exporter - Prometheus metrics for the eduVPN user portal
//!
//! Every request to the metrics path runs `vpn-user-portal-status --json`
//! and translates its output into Prometheus gauges.
//!
//! # Usage
//! ```sh
//! eduvpn_exporter --web.listen-address=:10036 --status-flags=connections
//! ```
//!
//! # Environment Variables
//! Every flag has an `EDUVPN_EXPORTER_*` counterpart (see `config`); flags win.

use anyhow::{Context, Result};
use clap::Parser;
use eduvpn_exporter::application::scrape::{DecodeMode, StatusCollector};
use eduvpn_exporter::config::{
    Config, LogFormat, LogLevel, StatusFlag, normalize_metrics_path, parse_listen_address,
};
use eduvpn_exporter::infrastructure::StatusCommand;
use eduvpn_exporter::infrastructure::observability::build_registry;
use eduvpn_exporter::infrastructure::observability::logging::init_logging;
use eduvpn_exporter::infrastructure::web::{LandingPage, router, serve};
use tracing::info;

#[derive(Parser)]
#[command(name = "eduvpn_exporter", author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path")]
    metrics_path: Option<String>,

    /// Path to the vpn-user-portal-status command
    #[arg(long = "status-cmd")]
    status_cmd: Option<String>,

    /// Flags to use when getting the vpn user portal status (repeatable)
    #[arg(long = "status-flags", value_enum)]
    status_flags: Vec<StatusFlag>,

    /// Fail the scrape when the status output is missing any expected field
    #[arg(long = "status-strict")]
    status_strict: bool,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", value_enum)]
    log_level: Option<LogLevel>,

    /// Output format of log messages
    #[arg(long = "log.format", value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Applies command-line overrides on top of the environment.
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(address) = self.listen_address {
            config.web.listen_address = parse_listen_address(&address)?;
        }
        if let Some(path) = self.metrics_path {
            config.web.metrics_path = normalize_metrics_path(&path)?;
        }
        if let Some(command) = self.status_cmd {
            config.status.command = command;
        }
        if !self.status_flags.is_empty() {
            config.status.flags = self.status_flags;
        }
        if self.status_strict {
            config.status.strict = true;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config)?;

    init_logging(&config.logging)?;

    info!("eduvpn_exporter {} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        command = %config.status.command,
        flags = ?config.status.flags,
        strict = config.status.strict,
        "Status command configured"
    );

    let source = StatusCommand::new(config.status.command.clone(), config.status.flags.clone());
    let mode = if config.status.strict {
        DecodeMode::Strict
    } else {
        DecodeMode::Lenient
    };
    let collector =
        StatusCollector::new(Box::new(source), mode).context("Failed to create collector")?;
    let registry = build_registry(Box::new(collector))?;

    let landing = LandingPage::for_exporter(&config.web.metrics_path)
        .context("Error creating landing page")?;
    let app = router(registry, landing, &config.web.metrics_path);

    let listener = tokio::net::TcpListener::bind(config.web.listen_address)
        .await
        .with_context(|| format!("Error starting HTTP server on {}", config.web.listen_address))?;
    info!(metrics_path = %config.web.metrics_path, "Serving metrics");

    serve(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received. Exiting...");
    })
    .await
}
