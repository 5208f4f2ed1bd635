//! One scrape cycle per registry pull.
//!
//! A cycle either fully succeeds (every sample, `up` = 1) or fully fails
//! (only `up` = 0 and the failure counter). Consumers never see counts from
//! a cycle whose output could not be decoded.

use crate::application::scrape::translator::{DecodeMode, MetricTranslator};
use crate::domain::errors::ScrapeError;
use crate::domain::ports::{MetricSink, StatusSource};
use crate::infrastructure::observability::metrics::{ScrapeHealth, StatusGauges};
use crate::infrastructure::status_command::truncate;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use std::time::Instant;
use tracing::{debug, error};

/// Longest slice of a malformed payload written to the debug log.
const PAYLOAD_PREVIEW_BYTES: usize = 4096;

pub struct StatusCollector {
    source: Box<dyn StatusSource>,
    translator: MetricTranslator,
    health: ScrapeHealth,
    descriptors: StatusGauges,
}

impl StatusCollector {
    pub fn new(source: Box<dyn StatusSource>, mode: DecodeMode) -> prometheus::Result<Self> {
        Ok(Self {
            source,
            translator: MetricTranslator::new(mode),
            health: ScrapeHealth::new()?,
            descriptors: StatusGauges::new()?,
        })
    }

    pub fn translator(&self) -> &MetricTranslator {
        &self.translator
    }

    pub fn health(&self) -> &ScrapeHealth {
        &self.health
    }

    /// Runs fetch, decode and projection, recording the outcome in
    /// [`ScrapeHealth`]. Nothing reaches `sink` unless decoding succeeded.
    pub fn scrape(&self, sink: &mut dyn MetricSink) -> Result<usize, ScrapeError> {
        let started = Instant::now();

        match self.run_cycle(sink) {
            Ok(samples) => {
                self.health.record_success();
                debug!(
                    samples,
                    unique_users = self.translator.tracker().count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Scrape succeeded"
                );
                Ok(samples)
            }
            Err(err) => {
                self.health.record_failure();
                error!(kind = err.kind(), error = %err, "Failed getting user portal status");
                Err(err)
            }
        }
    }

    fn run_cycle(&self, sink: &mut dyn MetricSink) -> Result<usize, ScrapeError> {
        let raw = self.source.fetch()?;

        let records = self.translator.decode(&raw).inspect_err(|err| {
            if matches!(err, ScrapeError::MalformedOutput(_)) {
                let output = String::from_utf8_lossy(&raw);
                debug!(
                    source = %self.source.describe(),
                    output = truncate(&output, PAYLOAD_PREVIEW_BYTES),
                    "Invalid JSON"
                );
            }
        })?;

        debug!(profiles = records.len(), "Decoded status output");
        Ok(self.translator.project(&records, sink))
    }
}

impl Collector for StatusCollector {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.descriptors.descs();
        descs.extend(self.health.descs());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = Vec::new();

        match StatusGauges::new() {
            Ok(mut gauges) => {
                if self.scrape(&mut gauges).is_ok() {
                    families.extend(gauges.collect());
                }
            }
            Err(err) => {
                self.health.record_failure();
                error!(error = %err, "Failed to create status gauges");
            }
        }

        families.extend(self.health.collect());
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{MetricKind, MetricSample};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        responses: Mutex<Vec<Result<Vec<u8>, ScrapeError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<u8>, ScrapeError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl StatusSource for ScriptedSource {
        fn fetch(&self) -> Result<Vec<u8>, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    const ONE_PROFILE: &[u8] = br#"[{"profile_id": "internet", "wireguard_max_connection_count": 10,
        "connection_list": [{"user_id": "alice", "ip_list": ["10.0.0.2"], "vpn_proto": "wireguard"}]}]"#;

    #[test]
    fn test_success_then_failure_then_success() {
        let source = ScriptedSource::new(vec![
            Ok(ONE_PROFILE.to_vec()),
            Ok(b"not json".to_vec()),
            Ok(ONE_PROFILE.to_vec()),
        ]);
        let collector = StatusCollector::new(Box::new(source), DecodeMode::Lenient).unwrap();

        let mut first: Vec<MetricSample> = Vec::new();
        assert_eq!(collector.scrape(&mut first).unwrap(), 8);
        assert_eq!(collector.health().up.get(), 1.0);

        let mut second: Vec<MetricSample> = Vec::new();
        let err = collector.scrape(&mut second).unwrap_err();
        assert_eq!(err.kind(), "malformed");
        assert!(second.is_empty());
        assert_eq!(collector.health().up.get(), 0.0);
        assert_eq!(collector.health().scrape_failures.get(), 1);

        let mut third: Vec<MetricSample> = Vec::new();
        collector.scrape(&mut third).unwrap();
        assert_eq!(collector.health().up.get(), 1.0);
        assert_eq!(collector.health().scrape_failures.get(), 1);
        let unique = third.last().unwrap();
        assert_eq!(unique.kind, MetricKind::UniqueUsers);
        assert_eq!(unique.value, 1.0);
    }

    #[test]
    fn test_command_failure_skips_decode() {
        let source = ScriptedSource::new(vec![Err(ScrapeError::CommandInvocation {
            command: "missing".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })]);
        let collector = StatusCollector::new(Box::new(source), DecodeMode::Lenient).unwrap();

        let mut samples: Vec<MetricSample> = Vec::new();
        assert_eq!(collector.scrape(&mut samples).unwrap_err().kind(), "command");
        assert!(samples.is_empty());
        assert_eq!(collector.translator().tracker().count(), 0);
    }

    #[test]
    fn test_descs_cover_every_family() {
        let source = ScriptedSource::new(vec![]);
        let collector = StatusCollector::new(Box::new(source), DecodeMode::Lenient).unwrap();

        let names: Vec<&str> = collector.desc().iter().map(|d| d.fq_name.as_str()).collect();
        for kind in MetricKind::ALL {
            assert!(names.contains(&format!("eduvpn_{}", kind.name()).as_str()));
        }
        assert!(names.contains(&"eduvpn_up"));
        assert!(names.contains(&"eduvpn_scrape_failures_total"));
    }

    #[test]
    fn test_collect_runs_one_fetch_per_pull() {
        let source = std::sync::Arc::new(ScriptedSource::new(vec![
            Ok(ONE_PROFILE.to_vec()),
            Ok(b"{}".to_vec()),
        ]));

        struct Shared(std::sync::Arc<ScriptedSource>);
        impl StatusSource for Shared {
            fn fetch(&self) -> Result<Vec<u8>, ScrapeError> {
                self.0.fetch()
            }
            fn describe(&self) -> String {
                self.0.describe()
            }
        }

        let collector =
            StatusCollector::new(Box::new(Shared(source.clone())), DecodeMode::Lenient).unwrap();

        let ok = collector.collect();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(ok.len() > 2);

        // Schema failure: only up and the failure counter.
        let failed = collector.collect();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(failed.len(), 2);
    }
}
