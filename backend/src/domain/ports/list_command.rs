//! Driving port for list mutations.
//!
//! The [`ListCommand`] trait is the inbound contract for every operation that
//! writes lists or access records. Every call receives a username the inbound
//! adapter has already authenticated; implementations trust it completely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ListId, Username};

/// Input for creating a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    /// Display name; trimmed and validated by the implementation.
    pub name: String,
    /// Initial free-form content.
    pub content: String,
}

/// Domain use-case port for list mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListCommand: Send + Sync {
    /// Create a list owned by `owner` and return its identifier.
    async fn create_list(
        &self,
        owner: &Username,
        request: CreateListRequest,
    ) -> Result<ListId, Error>;

    /// Replace the content of a list the requester owns or was shared.
    async fn update_list(
        &self,
        requester: &Username,
        id: &ListId,
        content: String,
    ) -> Result<(), Error>;

    /// Delete a list. Only its owner may do so.
    async fn delete_list(&self, requester: &Username, id: &ListId) -> Result<(), Error>;

    /// Grant `guest` access to a list `owner` owns.
    async fn share_list(
        &self,
        owner: &Username,
        guest: &Username,
        id: &ListId,
    ) -> Result<(), Error>;

    /// Drop the requester's own guest access to a list.
    async fn unshare_list(&self, requester: &Username, id: &ListId) -> Result<(), Error>;

    /// Withdraw `guest`'s access to a list `owner` owns.
    async fn revoke_guest(
        &self,
        owner: &Username,
        guest: &Username,
        id: &ListId,
    ) -> Result<(), Error>;
}
