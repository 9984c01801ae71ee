//! Driving port for read-only list and access queries.
//!
//! Queries never repair what they observe. An inconsistency between the
//! access index and the list store is reported and resolved as "no access".

use async_trait::async_trait;

use crate::domain::{Error, List, ListId, ListLink, Username};

/// Domain use-case port for list reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListQuery: Send + Sync {
    /// Fetch a list the requester owns or was shared.
    async fn get_list(&self, requester: &Username, id: &ListId) -> Result<List, Error>;

    /// Whether `username`'s access record links to `id`.
    ///
    /// Fails closed: lookup errors answer `false`.
    async fn has_access(&self, username: &Username, id: &ListId) -> bool;

    /// Owned links in insertion order.
    async fn list_owned(&self, username: &Username) -> Result<Vec<ListLink>, Error>;

    /// Shared links in insertion order.
    async fn list_shared(&self, username: &Username) -> Result<Vec<ListLink>, Error>;
}
