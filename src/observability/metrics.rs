//! # Metrics
//!
//! Prometheus counters for test synchronization.
//!
//! ## Metrics Exposed
//!
//! - `thousandeyes_tests_created_total` - Total number of tests created
//! - `thousandeyes_tests_updated_total` - Total number of tests updated
//! - `thousandeyes_tests_failed_total` - Total number of failed test creations or updates
//!
//! The counters are created once at startup with [`SyncMetrics::register`] and handed
//! to the components that increment them. They only ever go up.

use prometheus::{IntCounter, Registry};

/// Counters shared by the remote inventory and the metrics endpoint
#[derive(Debug, Clone)]
pub struct SyncMetrics {
    created: IntCounter,
    updated: IntCounter,
    failed: IntCounter,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
}

impl SyncMetrics {
    /// Create the counters and register them with `registry`
    ///
    /// # Errors
    ///
    /// Fails if a counter with the same name is already registered.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self {
            created: IntCounter::new(
                "thousandeyes_tests_created_total",
                "Total number of tests created",
            )?,
            updated: IntCounter::new(
                "thousandeyes_tests_updated_total",
                "Total number of tests updated",
            )?,
            failed: IntCounter::new(
                "thousandeyes_tests_failed_total",
                "Total number of failed test creations or updates",
            )?,
        };
        registry.register(Box::new(metrics.created.clone()))?;
        registry.register(Box::new(metrics.updated.clone()))?;
        registry.register(Box::new(metrics.failed.clone()))?;
        Ok(metrics)
    }

    pub fn increment_created(&self) {
        self.created.inc();
    }

    pub fn increment_updated(&self) {
        self.updated.inc();
    }

    pub fn increment_failed(&self) {
        self.failed.inc();
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created.get(),
            updated: self.updated.get(),
            failed: self.failed.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    #[test]
    fn test_counters_start_at_zero_and_increment() {
        let metrics = SyncMetrics::register(&Registry::new()).unwrap();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());

        metrics.increment_created();
        metrics.increment_created();
        metrics.increment_failed();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                created: 2,
                updated: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn test_double_registration_rejected() {
        let registry = Registry::new();
        SyncMetrics::register(&registry).unwrap();
        assert!(SyncMetrics::register(&registry).is_err());
    }

    #[test]
    fn test_registered_counters_gathered() {
        let registry = Registry::new();
        let metrics = SyncMetrics::register(&registry).unwrap();
        metrics.increment_updated();
        let families = registry.gather();
        assert_eq!(families.len(), 3);

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("thousandeyes_tests_updated_total 1"));
        assert!(text.contains("thousandeyes_tests_created_total 0"));
    }
}
