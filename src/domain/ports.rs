use crate::domain::errors::ScrapeError;
use crate::domain::metrics::MetricSample;

/// Produces the raw status payload for one scrape cycle.
///
/// Implementations block until the payload is available; callers on an async
/// runtime must move the call onto a blocking thread.
pub trait StatusSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, ScrapeError>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Receives samples as they are projected.
pub trait MetricSink {
    fn emit(&mut self, sample: MetricSample);
}

impl MetricSink for Vec<MetricSample> {
    fn emit(&mut self, sample: MetricSample) {
        self.push(sample);
    }
}
