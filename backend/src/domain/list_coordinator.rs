//! Ownership & Sharing Coordinator.
//!
//! Lists and access records live in two stores with no shared transaction.
//! Every operation that touches both follows one fixed order: the list (or
//! the record holding the owning right) is written first and the derived
//! access link second. A failure between the two steps therefore leaves a
//! list its owner cannot see rather than a link to a list that does not
//! exist. Completed steps are never rolled back; the gap is reported through
//! the [`ConsistencyMonitor`] for reconciliation.
//!
//! Access records are only ever changed through the atomic `push_link` and
//! `pull_link` primitives. Whole-record rewrites lose concurrent updates and
//! are not used anywhere.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::access_query::{
    AccessQueryService, disagreement, granted_kind, map_index_error,
};
use crate::domain::ports::{
    AccessIndexRepository, AccessRegistration, ConsistencyMonitor, CreateListRequest,
    ListCommand, ListIdGenerator, ListQuery, ListRepository, ListRepositoryError,
};
use crate::domain::{
    AccessRecord, Error, Inconsistency, InconsistencyKind, LinkKind, List, ListId, ListLink,
    ListName, SetMutation, Username,
};

/// Attempts at inserting a list before an id collision becomes `already_exists`.
pub const MAX_ID_ATTEMPTS: usize = 3;

const STEP_PUSH_OWNED_LINK: &str = "push_owned_link";
const STEP_PUSH_SHARED_LINK: &str = "push_shared_link";
const STEP_PULL_OWNED_LINK: &str = "pull_owned_link";
const STEP_PULL_GUEST_LINK: &str = "pull_guest_shared_link";
const STEP_PULL_SHARED_LINK: &str = "pull_shared_link";
const STEP_REMOVE_GUEST: &str = "remove_guest";
const STEP_GET_LIST: &str = "get_list";
const STEP_OWNER_CHECK: &str = "owner_check";

/// Translate list store failures into domain errors.
pub(crate) fn map_list_error(error: ListRepositoryError) -> Error {
    debug!(error = %error, "list store call failed");
    match error {
        ListRepositoryError::DuplicateKey { id } => {
            Error::already_exists(format!("list {id} already exists"))
        }
        other => Error::store_unavailable(format!("list store unavailable: {other}")),
    }
}

fn list_not_found(id: &ListId) -> Error {
    Error::not_found(format!("list {id} not found"))
}

fn user_not_registered(username: &Username) -> Error {
    Error::not_found(format!("user {username} is not registered"))
}

fn not_owner(id: &ListId) -> Error {
    Error::access_denied(format!("only the owner may manage list {id}"))
}

/// Coordinates multi-record list operations across both stores.
pub struct ListCoordinator<L, A, G> {
    lists: Arc<L>,
    index: Arc<A>,
    access: AccessQueryService<L, A>,
    ids: Arc<G>,
    clock: Arc<dyn Clock>,
    monitor: Arc<dyn ConsistencyMonitor>,
}

impl<L, A, G> ListCoordinator<L, A, G> {
    /// Wire the coordinator to its stores and collaborators.
    pub fn new(
        lists: Arc<L>,
        index: Arc<A>,
        ids: Arc<G>,
        clock: Arc<dyn Clock>,
        monitor: Arc<dyn ConsistencyMonitor>,
    ) -> Self {
        Self {
            access: AccessQueryService::new(
                Arc::clone(&lists),
                Arc::clone(&index),
                Arc::clone(&monitor),
            ),
            lists,
            index,
            ids,
            clock,
            monitor,
        }
    }

    /// The read-side service sharing this coordinator's stores and monitor.
    pub fn access_query(&self) -> &AccessQueryService<L, A> {
        &self.access
    }

    fn report(&self, report: Inconsistency) {
        self.monitor.report(&report);
    }
}

impl<L, A, G> ListCoordinator<L, A, G>
where
    L: ListRepository,
    A: AccessIndexRepository,
    G: ListIdGenerator,
{
    async fn find_list(&self, id: &ListId) -> Result<Option<List>, Error> {
        self.lists.find_by_id(id).await.map_err(map_list_error)
    }

    async fn require_owned_link(&self, owner: &Username, id: &ListId) -> Result<(), Error> {
        match self.access.link_kind(owner, id).await? {
            Some(LinkKind::Owned) => Ok(()),
            _ => Err(not_owner(id)),
        }
    }

    /// Load the list and confirm the record agrees `owner` owns it.
    async fn load_owned_list(&self, owner: &Username, id: &ListId) -> Result<List, Error> {
        let list = self.find_list(id).await?.ok_or_else(|| list_not_found(id))?;
        if !list.is_owner(owner) {
            self.report(Inconsistency::new(
                InconsistencyKind::OwnershipMismatch,
                owner.clone(),
                *id,
                STEP_OWNER_CHECK,
            ));
            return Err(not_owner(id));
        }
        Ok(list)
    }

    async fn insert_with_fresh_id(
        &self,
        owner: &Username,
        name: ListName,
        content: String,
    ) -> Result<List, Error> {
        let created_at = self.clock.utc();
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let list = List::new(
                self.ids.next_id(),
                owner.clone(),
                name.clone(),
                content.clone(),
                created_at,
            );
            match self.lists.insert(&list).await {
                Ok(()) => return Ok(list),
                Err(ListRepositoryError::DuplicateKey { id }) => {
                    warn!(list_id = %id, attempt, "generated list id collided; regenerating");
                }
                Err(err) => return Err(map_list_error(err)),
            }
        }
        Err(Error::already_exists(format!(
            "no unique list id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Remove a link; a failure is reported and swallowed.
    async fn pull_link_or_report(
        &self,
        username: &Username,
        kind: LinkKind,
        id: &ListId,
        step: &'static str,
    ) {
        if let Err(err) = self.index.pull_link(username, kind, id).await {
            self.report(
                Inconsistency::new(InconsistencyKind::DanglingLink, username.clone(), *id, step)
                    .caused_by(&err),
            );
        }
    }

    /// Remove `guest` from the list, then drop their shared link.
    async fn withdraw_guest(&self, guest: &Username, id: &ListId) -> Result<(), Error> {
        let removed = self
            .lists
            .remove_guest(id, guest)
            .await
            .map_err(map_list_error)?;
        match removed {
            SetMutation::Applied => {}
            SetMutation::Unchanged => self.report(Inconsistency::new(
                InconsistencyKind::StaleSharedLink,
                guest.clone(),
                *id,
                STEP_REMOVE_GUEST,
            )),
            SetMutation::MissingRecord => self.report(Inconsistency::new(
                InconsistencyKind::DanglingLink,
                guest.clone(),
                *id,
                STEP_REMOVE_GUEST,
            )),
        }

        if let Err(err) = self.index.pull_link(guest, LinkKind::Shared, id).await {
            self.report(
                Inconsistency::new(
                    InconsistencyKind::StaleSharedLink,
                    guest.clone(),
                    *id,
                    STEP_PULL_SHARED_LINK,
                )
                .caused_by(&err),
            );
            return Err(map_index_error(err));
        }
        Ok(())
    }
}

#[async_trait]
impl<L, A, G> ListCommand for ListCoordinator<L, A, G>
where
    L: ListRepository,
    A: AccessIndexRepository,
    G: ListIdGenerator,
{
    async fn create_list(
        &self,
        owner: &Username,
        request: CreateListRequest,
    ) -> Result<ListId, Error> {
        let name =
            ListName::new(&request.name).map_err(|err| Error::invalid_request(err.to_string()))?;
        if self.access.find_record(owner).await?.is_none() {
            return Err(user_not_registered(owner));
        }

        let list = self
            .insert_with_fresh_id(owner, name, request.content)
            .await?;
        let orphaned = || {
            Inconsistency::new(
                InconsistencyKind::OrphanedList,
                owner.clone(),
                list.id,
                STEP_PUSH_OWNED_LINK,
            )
        };
        match self
            .index
            .push_link(owner, LinkKind::Owned, &ListLink::for_list(&list))
            .await
        {
            Ok(SetMutation::Applied | SetMutation::Unchanged) => {
                info!(owner = %owner, list_id = %list.id, "list created");
                Ok(list.id)
            }
            Ok(SetMutation::MissingRecord) => {
                self.report(orphaned().caused_by("access record missing"));
                Err(user_not_registered(owner))
            }
            Err(err) => {
                self.report(orphaned().caused_by(&err));
                Err(map_index_error(err))
            }
        }
    }

    async fn update_list(
        &self,
        requester: &Username,
        id: &ListId,
        content: String,
    ) -> Result<(), Error> {
        if !self.access.has_access(requester, id).await {
            return Err(Error::access_denied(format!("no access to list {id}")));
        }
        let modified = self
            .lists
            .update_content(id, requester, &content, self.clock.utc())
            .await
            .map_err(map_list_error)?;
        if modified != 1 {
            return Err(Error::update_conflict(format!(
                "list {id} was not updated; it is missing or no longer accessible"
            ))
            .with_details(json!({ "modified": modified })));
        }
        Ok(())
    }

    /// Delete a list and every link to it.
    ///
    /// Guests added between reading the list and deleting it keep a dangling
    /// shared link, which grants nothing.
    async fn delete_list(&self, requester: &Username, id: &ListId) -> Result<(), Error> {
        let linked = self.access.link_kind(requester, id).await?;
        if linked == Some(LinkKind::Shared) {
            return Err(not_owner(id));
        }

        let Some(list) = self.find_list(id).await? else {
            if linked == Some(LinkKind::Owned) {
                // Finish a delete that stopped before the owner's link went.
                self.pull_link_or_report(requester, LinkKind::Owned, id, STEP_PULL_OWNED_LINK)
                    .await;
            }
            return Err(list_not_found(id));
        };

        if !list.is_owner(requester) {
            if linked.is_some() {
                self.report(Inconsistency::new(
                    InconsistencyKind::OwnershipMismatch,
                    requester.clone(),
                    *id,
                    STEP_OWNER_CHECK,
                ));
            }
            return Err(not_owner(id));
        }

        let deleted = self.lists.delete(id).await.map_err(map_list_error)?;
        if deleted == 0 {
            return Err(list_not_found(id));
        }

        self.pull_link_or_report(requester, LinkKind::Owned, id, STEP_PULL_OWNED_LINK)
            .await;
        for guest in &list.guests {
            self.pull_link_or_report(guest, LinkKind::Shared, id, STEP_PULL_GUEST_LINK)
                .await;
        }
        info!(
            owner = %requester,
            list_id = %id,
            guests = list.guests.len(),
            "list deleted"
        );
        Ok(())
    }

    async fn share_list(
        &self,
        owner: &Username,
        guest: &Username,
        id: &ListId,
    ) -> Result<(), Error> {
        if owner == guest {
            return Err(Error::invalid_request("a list cannot be shared with its owner"));
        }
        self.require_owned_link(owner, id).await?;
        if self.access.find_record(guest).await?.is_none() {
            return Err(user_not_registered(guest));
        }
        let list = self.load_owned_list(owner, id).await?;

        let added = self
            .lists
            .add_guest(id, guest)
            .await
            .map_err(map_list_error)?;
        if !added.found_record() {
            return Err(list_not_found(id));
        }

        let missing_link = || {
            Inconsistency::new(
                InconsistencyKind::MissingSharedLink,
                guest.clone(),
                *id,
                STEP_PUSH_SHARED_LINK,
            )
        };
        match self
            .index
            .push_link(guest, LinkKind::Shared, &ListLink::for_list(&list))
            .await
        {
            Ok(SetMutation::Applied | SetMutation::Unchanged) => {
                info!(owner = %owner, guest = %guest, list_id = %id, "list shared");
                Ok(())
            }
            Ok(SetMutation::MissingRecord) => {
                self.report(missing_link().caused_by("access record missing"));
                Err(user_not_registered(guest))
            }
            Err(err) => {
                self.report(missing_link().caused_by(&err));
                Err(map_index_error(err))
            }
        }
    }

    async fn unshare_list(&self, requester: &Username, id: &ListId) -> Result<(), Error> {
        match self.access.link_kind(requester, id).await? {
            Some(LinkKind::Owned) => Err(Error::access_denied(
                "owners cannot unshare their own list; delete it instead",
            )
            .with_details(json!({ "code": "owner_cannot_unshare" }))),
            None => Err(Error::not_found(format!(
                "list {id} is not shared with {requester}"
            ))),
            Some(LinkKind::Shared) => {
                self.withdraw_guest(requester, id).await?;
                info!(guest = %requester, list_id = %id, "list unshared");
                Ok(())
            }
        }
    }

    async fn revoke_guest(
        &self,
        owner: &Username,
        guest: &Username,
        id: &ListId,
    ) -> Result<(), Error> {
        self.require_owned_link(owner, id).await?;
        let list = self.load_owned_list(owner, id).await?;
        if !list.is_guest(guest) {
            return Err(Error::not_found(format!(
                "{guest} is not a guest of list {id}"
            )));
        }
        self.withdraw_guest(guest, id).await?;
        info!(owner = %owner, guest = %guest, list_id = %id, "guest revoked");
        Ok(())
    }
}

#[async_trait]
impl<L, A, G> ListQuery for ListCoordinator<L, A, G>
where
    L: ListRepository,
    A: AccessIndexRepository,
    G: ListIdGenerator,
{
    /// Both the index and the list must agree the requester has access.
    async fn get_list(&self, requester: &Username, id: &ListId) -> Result<List, Error> {
        let list = self.find_list(id).await?.ok_or_else(|| list_not_found(id))?;
        let linked = self.access.link_kind(requester, id).await?;
        let expected = granted_kind(&list, requester);

        match (linked, expected) {
            (Some(held), Some(granted)) if held == granted => Ok(list),
            (None, None) => Err(Error::access_denied(format!("no access to list {id}"))),
            (linked, expected) => {
                self.report(Inconsistency::new(
                    disagreement(linked, expected),
                    requester.clone(),
                    *id,
                    STEP_GET_LIST,
                ));
                Err(Error::access_denied(format!("no access to list {id}")))
            }
        }
    }

    async fn has_access(&self, username: &Username, id: &ListId) -> bool {
        self.access.has_access(username, id).await
    }

    async fn list_owned(&self, username: &Username) -> Result<Vec<ListLink>, Error> {
        self.access.list_owned(username).await
    }

    async fn list_shared(&self, username: &Username) -> Result<Vec<ListLink>, Error> {
        self.access.list_shared(username).await
    }
}

#[async_trait]
impl<L, A, G> AccessRegistration for ListCoordinator<L, A, G>
where
    L: ListRepository,
    A: AccessIndexRepository,
    G: ListIdGenerator,
{
    async fn register_user(&self, username: &Username) -> Result<(), Error> {
        self.index
            .insert(&AccessRecord::empty(username.clone()))
            .await
            .map_err(map_index_error)?;
        info!(username = %username, "access record created");
        Ok(())
    }
}

#[cfg(test)]
#[path = "list_coordinator_tests.rs"]
mod tests;
