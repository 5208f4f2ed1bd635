use crate::infrastructure::observability::metrics::build_info;
use anyhow::{Context, Result};
use prometheus::core::Collector;
use prometheus::{Registry, TextEncoder};

/// Registry served on the metrics path: the scrape collector, build info
/// and, on Linux, process metrics.
pub fn build_registry(status: Box<dyn Collector>) -> Result<Registry> {
    let registry = Registry::new();

    registry
        .register(status)
        .context("Failed to register status collector")?;
    registry
        .register(Box::new(build_info()?))
        .context("Failed to register build info")?;

    #[cfg(target_os = "linux")]
    registry
        .register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
        .context("Failed to register process collector")?;

    Ok(registry)
}

/// Gathers `registry` and renders it in the Prometheus text format.
pub fn render(registry: &Registry) -> Result<String> {
    TextEncoder::new()
        .encode_to_string(&registry.gather())
        .context("Failed to encode metrics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, Opts};

    #[test]
    fn test_registry_renders_collectors() {
        let counter = IntCounter::with_opts(Opts::new("test_pulls_total", "test")).unwrap();
        counter.inc();

        let registry = build_registry(Box::new(counter)).expect("Failed to build registry");
        let output = render(&registry).expect("Failed to render");

        assert!(output.contains("test_pulls_total 1"));
        assert!(output.contains("eduvpn_exporter_build_info"));
    }

    #[test]
    fn test_duplicate_collector_is_rejected() {
        let registry = build_registry(Box::new(
            IntCounter::with_opts(Opts::new("test_dup_total", "test")).unwrap(),
        ))
        .unwrap();
        let again = IntCounter::with_opts(Opts::new("test_dup_total", "test")).unwrap();
        assert!(registry.register(Box::new(again)).is_err());
    }
}
