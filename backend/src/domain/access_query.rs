//! Access Query Service.
//!
//! Answers "may this user act on this list?" and "which lists does this user
//! own or have shared?". A link in the access index only counts once the list
//! it points at exists and names the user in the same role; dangling or stale
//! links grant nothing. The service is read-only: disagreements are reported
//! through the [`ConsistencyMonitor`] and never repaired here.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::list_coordinator::map_list_error;
use crate::domain::ports::{
    AccessIndexRepository, AccessIndexRepositoryError, ConsistencyMonitor, ListRepository,
};
use crate::domain::{
    AccessRecord, Error, Inconsistency, InconsistencyKind, LinkKind, List, ListId, ListLink,
    Username,
};

const STEP_VERIFY_LINK: &str = "verify_link";

/// Translate access index failures into domain errors.
///
/// Every adapter failure is infrastructure; the adapter text stays in the
/// message for server-side logs and is redacted before it reaches callers.
pub(crate) fn map_index_error(error: AccessIndexRepositoryError) -> Error {
    debug!(error = %error, "access index call failed");
    match error {
        AccessIndexRepositoryError::DuplicateUser { username } => {
            Error::already_exists(format!("user {username} is already registered"))
        }
        other => Error::store_unavailable(format!("access index unavailable: {other}")),
    }
}

/// The role `list` itself gives `username`, if any.
pub(crate) fn granted_kind(list: &List, username: &Username) -> Option<LinkKind> {
    if list.is_owner(username) {
        Some(LinkKind::Owned)
    } else if list.is_guest(username) {
        Some(LinkKind::Shared)
    } else {
        None
    }
}

/// Classify a disagreement between the index and the list about one user.
pub(crate) fn disagreement(
    linked: Option<LinkKind>,
    granted: Option<LinkKind>,
) -> InconsistencyKind {
    match (linked, granted) {
        (Some(LinkKind::Shared), None) => InconsistencyKind::StaleSharedLink,
        (None, Some(LinkKind::Owned)) => InconsistencyKind::OrphanedList,
        (None, Some(LinkKind::Shared)) => InconsistencyKind::MissingSharedLink,
        _ => InconsistencyKind::OwnershipMismatch,
    }
}

/// Read-side queries over the access index, checked against the list store.
pub struct AccessQueryService<L, A> {
    lists: Arc<L>,
    index: Arc<A>,
    monitor: Arc<dyn ConsistencyMonitor>,
}

impl<L, A> AccessQueryService<L, A> {
    /// Create a service reading links from `index` and lists from `lists`.
    pub fn new(lists: Arc<L>, index: Arc<A>, monitor: Arc<dyn ConsistencyMonitor>) -> Self {
        Self {
            lists,
            index,
            monitor,
        }
    }
}

impl<L, A> Clone for AccessQueryService<L, A> {
    fn clone(&self) -> Self {
        Self {
            lists: Arc::clone(&self.lists),
            index: Arc::clone(&self.index),
            monitor: Arc::clone(&self.monitor),
        }
    }
}

impl<L, A> AccessQueryService<L, A>
where
    L: ListRepository,
    A: AccessIndexRepository,
{
    /// Fetch the user's access record, if registered.
    pub async fn find_record(&self, username: &Username) -> Result<Option<AccessRecord>, Error> {
        self.index
            .find_by_username(username)
            .await
            .map_err(map_index_error)
    }

    /// Which of the user's link-sets holds `id`, as recorded in the index.
    ///
    /// Unregistered users hold no links. The list itself is not consulted.
    pub async fn link_kind(
        &self,
        username: &Username,
        id: &ListId,
    ) -> Result<Option<LinkKind>, Error> {
        Ok(self
            .find_record(username)
            .await?
            .and_then(|record| record.link_kind(id)))
    }

    /// Whether the user holds a link to `id` that the list confirms.
    ///
    /// Dangling and stale links are reported and deny access. Any lookup
    /// failure denies access.
    pub async fn has_access(&self, username: &Username, id: &ListId) -> bool {
        match self.confirmed_kind(username, id).await {
            Ok(kind) => kind.is_some(),
            Err(err) => {
                warn!(
                    username = %username,
                    list_id = %id,
                    code = ?err.code(),
                    "access lookup failed; denying"
                );
                false
            }
        }
    }

    /// Owned links in insertion order, skipping links the list store denies.
    pub async fn list_owned(&self, username: &Username) -> Result<Vec<ListLink>, Error> {
        self.links(username, LinkKind::Owned).await
    }

    /// Shared links in insertion order, skipping links the list store denies.
    pub async fn list_shared(&self, username: &Username) -> Result<Vec<ListLink>, Error> {
        self.links(username, LinkKind::Shared).await
    }

    async fn confirmed_kind(
        &self,
        username: &Username,
        id: &ListId,
    ) -> Result<Option<LinkKind>, Error> {
        let Some(linked) = self.link_kind(username, id).await? else {
            return Ok(None);
        };
        Ok(self.confirm(username, id, linked).await?.then_some(linked))
    }

    /// Check one index link against the list it points at.
    async fn confirm(
        &self,
        username: &Username,
        id: &ListId,
        linked: LinkKind,
    ) -> Result<bool, Error> {
        let list = self.lists.find_by_id(id).await.map_err(map_list_error)?;
        let kind = match list {
            None => InconsistencyKind::DanglingLink,
            Some(list) => {
                let granted = granted_kind(&list, username);
                if granted == Some(linked) {
                    return Ok(true);
                }
                disagreement(Some(linked), granted)
            }
        };
        self.monitor.report(&Inconsistency::new(
            kind,
            username.clone(),
            *id,
            STEP_VERIFY_LINK,
        ));
        Ok(false)
    }

    async fn links(&self, username: &Username, kind: LinkKind) -> Result<Vec<ListLink>, Error> {
        let Some(record) = self.find_record(username).await? else {
            return Ok(Vec::new());
        };
        let mut confirmed = Vec::new();
        for link in record.links(kind) {
            if self.confirm(username, &link.id, kind).await? {
                confirmed.push(link.clone());
            }
        }
        Ok(confirmed)
    }
}
