//! Driven port for list record persistence.
//!
//! The [`ListRepository`] is the List Store: it owns list content and guest
//! membership. Adapters must make every method atomic with respect to a
//! single list record; the coordinator relies on that instead of locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{List, ListId, SetMutation, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by list store adapters.
    pub enum ListRepositoryError {
        /// Store connection could not be established or was lost.
        Connection { message: String } =>
            "list store connection failed: {message}",
        /// The call exceeded the configured operation timeout.
        Timeout { operation: String } =>
            "list store operation timed out: {operation}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "list store query failed: {message}",
        /// A list with the same identifier already exists.
        DuplicateKey { id: String } =>
            "list id already exists: {id}",
    }
}

/// Port for list record storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Fetch a list by identifier.
    async fn find_by_id(&self, id: &ListId) -> Result<Option<List>, ListRepositoryError>;

    /// Insert a new list.
    ///
    /// Fails with [`ListRepositoryError::DuplicateKey`] when the identifier is
    /// already taken.
    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError>;

    /// Replace the content of a list the editor may access.
    ///
    /// The write only applies when the list exists and `editor` is its owner
    /// or one of its guests. Returns the number of modified records, which is
    /// `0` or `1`.
    async fn update_content(
        &self,
        id: &ListId,
        editor: &Username,
        content: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<u64, ListRepositoryError>;

    /// Atomically add `guest` to the list's guest set.
    async fn add_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError>;

    /// Atomically remove `guest` from the list's guest set.
    async fn remove_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError>;

    /// Delete a list. Returns the number of deleted records.
    async fn delete(&self, id: &ListId) -> Result<u64, ListRepositoryError>;
}
