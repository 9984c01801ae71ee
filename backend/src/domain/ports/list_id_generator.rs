//! Driven port supplying identifiers for new lists.

use crate::domain::ListId;

/// Source of fresh, globally unique, sortable list identifiers.
#[cfg_attr(test, mockall::automock)]
pub trait ListIdGenerator: Send + Sync {
    /// Produce the next identifier.
    fn next_id(&self) -> ListId;
}

/// Generates time-ordered UUIDv7 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7ListIdGenerator;

impl ListIdGenerator for UuidV7ListIdGenerator {
    fn next_id(&self) -> ListId {
        ListId::generate()
    }
}
