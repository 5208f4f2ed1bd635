//! Metric surface exported for each profile.
//!
//! Names, help strings and label sets are fixed here so nothing downstream
//! looks a descriptor up by name at scrape time.

/// Prefix shared by every exporter metric.
pub const NAMESPACE: &str = "eduvpn";

pub const PROTO_OPENVPN: &str = "openvpn";
pub const PROTO_WIREGUARD: &str = "wireguard";

const PROFILE_PROTO_LABELS: &[&str] = &["profile", "vpn_proto"];
const CONNECTION_LABELS: &[&str] = &["profile", "user_id", "ip_list", "vpn_proto"];

/// Per-scrape gauges derived from the status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    ActiveConnections,
    MaxConnections,
    AllocatedIps,
    FreeIps,
    ConnectionList,
    UniqueUsers,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::ActiveConnections,
        MetricKind::MaxConnections,
        MetricKind::AllocatedIps,
        MetricKind::FreeIps,
        MetricKind::ConnectionList,
        MetricKind::UniqueUsers,
    ];

    /// Name without the namespace prefix.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::ActiveConnections => "active_connections",
            MetricKind::MaxConnections => "max_connections",
            MetricKind::AllocatedIps => "allocated_ips",
            MetricKind::FreeIps => "free_ips",
            MetricKind::ConnectionList => "connection_list",
            MetricKind::UniqueUsers => "unique_users",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricKind::ActiveConnections => "Number of active connections.",
            MetricKind::MaxConnections => "Maximum number of connections.",
            MetricKind::AllocatedIps => "Number of allocated IP addresses.",
            MetricKind::FreeIps => "Number of free IP addresses.",
            MetricKind::ConnectionList => "Information about active connections.",
            MetricKind::UniqueUsers => {
                "Number of unique users with active connections. Only has a value if the status flag `connections` is passed to the exporter."
            }
        }
    }

    pub fn label_names(self) -> &'static [&'static str] {
        match self {
            MetricKind::ActiveConnections
            | MetricKind::MaxConnections
            | MetricKind::AllocatedIps
            | MetricKind::FreeIps => PROFILE_PROTO_LABELS,
            MetricKind::ConnectionList => CONNECTION_LABELS,
            MetricKind::UniqueUsers => &[],
        }
    }
}

/// One value destined for the sink. `labels` are values ordered as
/// [`MetricKind::label_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub kind: MetricKind,
    pub value: f64,
    pub labels: Vec<String>,
}

impl MetricSample {
    pub fn new(kind: MetricKind, value: f64, labels: Vec<String>) -> Self {
        debug_assert_eq!(labels.len(), kind.label_names().len());
        Self {
            kind,
            value,
            labels,
        }
    }

    /// Sample labelled with a profile id and protocol tag.
    pub fn per_profile(kind: MetricKind, value: u64, profile: &str, proto: &str) -> Self {
        Self::new(kind, value as f64, vec![profile.to_string(), proto.to_string()])
    }

    /// Looks up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.kind
            .label_names()
            .iter()
            .position(|label| *label == name)
            .and_then(|idx| self.labels.get(idx))
            .map(String::as_str)
    }
}
