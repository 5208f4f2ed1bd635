//! Scrape-and-translate pipeline: fetch, decode, project.

pub mod collector;
pub mod tracker;
pub mod translator;

pub use collector::StatusCollector;
pub use tracker::UniqueUserTracker;
pub use translator::{DecodeMode, MetricTranslator};
