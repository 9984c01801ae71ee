//! Driven port receiving cross-record inconsistency reports.
//!
//! Reports are fire-and-forget: the coordinator never waits on, or fails
//! because of, the monitor. Adapters typically log the report for later
//! reconciliation.

use crate::domain::Inconsistency;

/// Sink for detected invariant violations between lists and access records.
#[cfg_attr(test, mockall::automock)]
pub trait ConsistencyMonitor: Send + Sync {
    /// Record an observed violation.
    fn report(&self, report: &Inconsistency);
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpConsistencyMonitor;

impl ConsistencyMonitor for NoOpConsistencyMonitor {
    fn report(&self, _report: &Inconsistency) {}
}
