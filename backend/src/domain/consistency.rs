//! Reports of observed cross-record invariant violations.
//!
//! Multi-record operations never roll back a completed step. When a later
//! step fails, or a read shows the index and the list disagreeing, the
//! coordinator emits an [`Inconsistency`] with enough context for manual or
//! background reconciliation. Reports are never surfaced to callers as errors.

use std::fmt;

use serde::Serialize;

use super::{ListId, Username};

/// Category of invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    /// A list exists but its owner's index has no owned link to it.
    OrphanedList,
    /// An index link points at a list that no longer exists.
    DanglingLink,
    /// A shared link remains for a user the list no longer names as guest.
    StaleSharedLink,
    /// The list names a guest whose index lacks the shared link.
    MissingSharedLink,
    /// Index and list disagree about who owns the list.
    OwnershipMismatch,
}

impl InconsistencyKind {
    /// Stable label used in structured logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrphanedList => "orphaned_list",
            Self::DanglingLink => "dangling_link",
            Self::StaleSharedLink => "stale_shared_link",
            Self::MissingSharedLink => "missing_shared_link",
            Self::OwnershipMismatch => "ownership_mismatch",
        }
    }
}

impl fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected violation, with the user, list and failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inconsistency {
    pub kind: InconsistencyKind,
    pub username: Username,
    pub list_id: ListId,
    /// Short identifier of the protocol step that failed or observed it.
    pub step: &'static str,
    /// Underlying failure, if a store call failed.
    pub cause: Option<String>,
}

impl Inconsistency {
    /// Build a report with no underlying cause.
    pub fn new(
        kind: InconsistencyKind,
        username: Username,
        list_id: ListId,
        step: &'static str,
    ) -> Self {
        Self {
            kind,
            username,
            list_id,
            step,
            cause: None,
        }
    }

    /// Attach the store failure that left the records inconsistent.
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for user {} and list {} at step {}",
            self.kind, self.username, self.list_id, self.step
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}
