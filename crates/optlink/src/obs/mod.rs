pub mod sink;

mod metrics;

pub use metrics::{ErrorCounters, MetricsSnapshot};

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> MetricsSnapshot {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}
