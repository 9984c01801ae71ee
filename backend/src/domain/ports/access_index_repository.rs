//! Driven port for per-user access records.
//!
//! The Access Index Store only offers atomic per-record link operations.
//! There is deliberately no "save whole record" method: rewriting a record
//! from a stale read loses concurrent share/unshare updates.

use async_trait::async_trait;

use crate::domain::{AccessRecord, LinkKind, ListId, ListLink, SetMutation, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by access index adapters.
    pub enum AccessIndexRepositoryError {
        /// Store connection could not be established or was lost.
        Connection { message: String } =>
            "access index connection failed: {message}",
        /// The call exceeded the configured operation timeout.
        Timeout { operation: String } =>
            "access index operation timed out: {operation}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "access index query failed: {message}",
        /// A record for the username already exists.
        DuplicateUser { username: String } =>
            "access record already exists for {username}",
    }
}

/// Port for access record storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessIndexRepository: Send + Sync {
    /// Fetch the record for a user.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<AccessRecord>, AccessIndexRepositoryError>;

    /// Insert a new record.
    ///
    /// Fails with [`AccessIndexRepositoryError::DuplicateUser`] when the user
    /// already has one.
    async fn insert(&self, record: &AccessRecord) -> Result<(), AccessIndexRepositoryError>;

    /// Atomically append `link` to the user's `kind` link-set.
    ///
    /// Returns [`SetMutation::Unchanged`] when the user already holds a link
    /// to the same list in either set.
    async fn push_link(
        &self,
        username: &Username,
        kind: LinkKind,
        link: &ListLink,
    ) -> Result<SetMutation, AccessIndexRepositoryError>;

    /// Atomically remove the link to `id` from the user's `kind` link-set.
    async fn pull_link(
        &self,
        username: &Username,
        kind: LinkKind,
        id: &ListId,
    ) -> Result<SetMutation, AccessIndexRepositoryError>;
}
