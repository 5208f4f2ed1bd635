//! Prometheus metric families for eduVPN.
//!
//! All metrics use the `eduvpn_` prefix. Status gauges are rebuilt for every
//! scrape so a pull only ever reports values from its own cycle; scrape
//! health lives for the whole process.

use crate::domain::metrics::{MetricKind, MetricSample, NAMESPACE};
use crate::domain::ports::MetricSink;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, IntCounter, Opts};

fn opts_for(kind: MetricKind) -> Opts {
    Opts::new(kind.name(), kind.help()).namespace(NAMESPACE)
}

/// One gauge family per [`MetricKind`], filled through [`MetricSink`].
#[derive(Clone)]
pub struct StatusGauges {
    /// Active connections per profile and protocol
    pub active_connections: GaugeVec,
    /// Configured maximum connections per profile and protocol
    pub max_connections: GaugeVec,
    /// Allocated WireGuard addresses per profile
    pub allocated_ips: GaugeVec,
    /// Free WireGuard addresses per profile
    pub free_ips: GaugeVec,
    /// One series per active connection, always 1
    pub connection_list: GaugeVec,
    /// Distinct users seen since start
    pub unique_users: Gauge,
}

impl StatusGauges {
    pub fn new() -> prometheus::Result<Self> {
        let vec_for = |kind: MetricKind| GaugeVec::new(opts_for(kind), kind.label_names());

        Ok(Self {
            active_connections: vec_for(MetricKind::ActiveConnections)?,
            max_connections: vec_for(MetricKind::MaxConnections)?,
            allocated_ips: vec_for(MetricKind::AllocatedIps)?,
            free_ips: vec_for(MetricKind::FreeIps)?,
            connection_list: vec_for(MetricKind::ConnectionList)?,
            unique_users: Gauge::with_opts(opts_for(MetricKind::UniqueUsers))?,
        })
    }

    fn labelled(&self, kind: MetricKind) -> Option<&GaugeVec> {
        match kind {
            MetricKind::ActiveConnections => Some(&self.active_connections),
            MetricKind::MaxConnections => Some(&self.max_connections),
            MetricKind::AllocatedIps => Some(&self.allocated_ips),
            MetricKind::FreeIps => Some(&self.free_ips),
            MetricKind::ConnectionList => Some(&self.connection_list),
            MetricKind::UniqueUsers => None,
        }
    }

    pub fn descs(&self) -> Vec<&Desc> {
        let mut descs: Vec<&Desc> = MetricKind::ALL
            .iter()
            .filter_map(|kind| self.labelled(*kind))
            .flat_map(|vec| vec.desc())
            .collect();
        descs.extend(self.unique_users.desc());
        descs
    }

    /// Families with at least one series. Labelled families nothing was
    /// emitted into are skipped, as the text encoder rejects empty families.
    pub fn collect(&self) -> Vec<MetricFamily> {
        let mut families: Vec<MetricFamily> = MetricKind::ALL
            .iter()
            .filter_map(|kind| self.labelled(*kind))
            .flat_map(|vec| vec.collect())
            .filter(|family| !family.get_metric().is_empty())
            .collect();
        families.extend(self.unique_users.collect());
        families
    }
}

impl MetricSink for StatusGauges {
    fn emit(&mut self, sample: MetricSample) {
        let Some(vec) = self.labelled(sample.kind) else {
            self.unique_users.set(sample.value);
            return;
        };

        let values: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        match vec.get_metric_with_label_values(&values) {
            Ok(gauge) => gauge.set(sample.value),
            Err(err) => tracing::warn!(
                metric = sample.kind.name(),
                error = %err,
                "Dropping sample with mismatched labels"
            ),
        }
    }
}

/// Scrape health, kept across cycles.
#[derive(Clone)]
pub struct ScrapeHealth {
    /// 1 if the last scrape succeeded
    pub up: Gauge,
    /// Failed scrapes since start
    pub scrape_failures: IntCounter,
}

impl ScrapeHealth {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            up: Gauge::with_opts(
                Opts::new("up", "Was the last scrape of eduVPN successful?").namespace(NAMESPACE),
            )?,
            scrape_failures: IntCounter::with_opts(
                Opts::new("scrape_failures_total", "Total number of failed scrapes.")
                    .namespace(NAMESPACE),
            )?,
        })
    }

    pub fn record_success(&self) {
        self.up.set(1.0);
    }

    pub fn record_failure(&self) {
        self.up.set(0.0);
        self.scrape_failures.inc();
    }

    pub fn descs(&self) -> Vec<&Desc> {
        let mut descs = self.up.desc();
        descs.extend(self.scrape_failures.desc());
        descs
    }

    pub fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.up.collect();
        families.extend(self.scrape_failures.collect());
        families
    }
}

/// `eduvpn_exporter_build_info`, constant 1 labelled with the crate version.
pub fn build_info() -> prometheus::Result<GaugeVec> {
    let build_info = GaugeVec::new(
        Opts::new(
            "eduvpn_exporter_build_info",
            "A metric with a constant '1' value labeled by the exporter version.",
        ),
        &["version"],
    )?;
    build_info
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);
    Ok(build_info)
}
