// Scrape failure taxonomy
pub mod errors;

// Exported metric descriptors and samples
pub mod metrics;

// Port interfaces
pub mod ports;

// Upstream status records
pub mod status;
