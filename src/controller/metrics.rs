//! Controller Metrics
//!
//! Prometheus collectors for the LVMCluster reconciler.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Reconciliation metrics
#[derive(Clone)]
pub struct ControllerMetrics {
    /// Reconciliations started
    pub reconciliations: IntCounter,
    /// Failed reconciliations by error kind
    pub failures: IntCounterVec,
    /// Time spent in a reconciliation
    pub reconcile_duration: Histogram,
}

impl ControllerMetrics {
    /// Create the collectors and register them with `registry`
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let reconciliations = IntCounter::with_opts(Opts::new(
            "lvm_operator_reconciliations_total",
            "Total number of LVMCluster reconciliations",
        ))?;
        let failures = IntCounterVec::new(
            Opts::new(
                "lvm_operator_reconcile_failures_total",
                "Failed LVMCluster reconciliations by error kind",
            ),
            &["kind"],
        )?;
        let reconcile_duration = Histogram::with_opts(HistogramOpts::new(
            "lvm_operator_reconcile_duration_seconds",
            "Duration of LVMCluster reconciliations",
        ))?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(reconcile_duration.clone()))?;

        Ok(Self {
            reconciliations,
            failures,
            reconcile_duration,
        })
    }

    /// Count a failed reconciliation
    pub fn record_failure(&self, kind: &str) {
        self.failures.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_record() {
        let registry = Registry::new();
        let metrics = ControllerMetrics::register(&registry).unwrap();

        metrics.reconciliations.inc();
        metrics.record_failure("self_lookup_failed");
        metrics.record_failure("self_lookup_failed");

        assert_eq!(metrics.reconciliations.get(), 1);
        assert_eq!(
            metrics
                .failures
                .with_label_values(&["self_lookup_failed"])
                .get(),
            2
        );
        assert_eq!(registry.gather().len(), 3);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ControllerMetrics::register(&registry).unwrap();
        assert!(ControllerMetrics::register(&registry).is_err());
    }
}
