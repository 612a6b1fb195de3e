//! # Observability
//!
//! - `metrics`: Prometheus counters for created, updated and failed tests

pub mod metrics;

pub use metrics::{MetricsSnapshot, SyncMetrics};
