//! Structured-log sink for cross-record inconsistency reports.

use tracing::warn;

use crate::domain::Inconsistency;
use crate::domain::ports::ConsistencyMonitor;

/// Emits each report as a `warn` event under the `listshare::consistency`
/// target so reconciliation tooling can filter for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsistencyMonitor;

impl ConsistencyMonitor for TracingConsistencyMonitor {
    fn report(&self, report: &Inconsistency) {
        warn!(
            target: "listshare::consistency",
            kind = report.kind.as_str(),
            username = %report.username,
            list_id = %report.list_id,
            step = report.step,
            cause = report.cause.as_deref().unwrap_or(""),
            "list and access index disagree"
        );
    }
}
