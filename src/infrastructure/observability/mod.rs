//! Pull-based observability for the exporter.
//!
//! Metrics are gathered on demand when the metrics path is requested; logs
//! go to stdout through `tracing`.

pub mod logging;
pub mod metrics;
pub mod registry;

pub use metrics::{ScrapeHealth, StatusGauges};
pub use registry::{build_registry, render};
