//! Metrics/Health Surface (C9): counters, latency histograms, and
//! component readiness probes.

pub mod health;
pub mod metrics;

pub use health::HealthReport;
pub use metrics::Metrics;
