//! In-memory List Store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::POISONED;
use crate::domain::ports::{ListRepository, ListRepositoryError};
use crate::domain::{List, ListId, SetMutation, Username};

/// List records keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryListRepository {
    lists: Mutex<HashMap<ListId, List>>,
}

impl InMemoryListRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<ListId, List>>, ListRepositoryError> {
        self.lists
            .lock()
            .map_err(|_| ListRepositoryError::query(POISONED))
    }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn find_by_id(&self, id: &ListId) -> Result<Option<List>, ListRepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError> {
        let mut lists = self.guard()?;
        if lists.contains_key(&list.id) {
            return Err(ListRepositoryError::duplicate_key(list.id.to_string()));
        }
        lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn update_content(
        &self,
        id: &ListId,
        editor: &Username,
        content: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<u64, ListRepositoryError> {
        let mut lists = self.guard()?;
        match lists.get_mut(id) {
            Some(list) if list.grants_access_to(editor) => {
                list.content = content.to_owned();
                list.last_changed = changed_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn add_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError> {
        let mut lists = self.guard()?;
        let Some(list) = lists.get_mut(id) else {
            return Ok(SetMutation::MissingRecord);
        };
        if list.grants_access_to(guest) {
            return Ok(SetMutation::Unchanged);
        }
        list.guests.push(guest.clone());
        Ok(SetMutation::Applied)
    }

    async fn remove_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError> {
        let mut lists = self.guard()?;
        let Some(list) = lists.get_mut(id) else {
            return Ok(SetMutation::MissingRecord);
        };
        let before = list.guests.len();
        list.guests.retain(|existing| existing != guest);
        Ok(if list.guests.len() == before {
            SetMutation::Unchanged
        } else {
            SetMutation::Applied
        })
    }

    async fn delete(&self, id: &ListId) -> Result<u64, ListRepositoryError> {
        Ok(u64::from(self.guard()?.remove(id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ListName;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn user(raw: &str) -> Username {
        Username::new(raw).expect("valid username")
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn groceries() -> List {
        List::new(
            ListId::generate(),
            user("alice"),
            ListName::new("Groceries").expect("valid name"),
            "milk",
            at(9),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn insert_rejects_duplicate_ids(groceries: List) {
        let repo = InMemoryListRepository::new();
        repo.insert(&groceries).await.expect("first insert");

        let err = repo.insert(&groceries).await.expect_err("duplicate");
        assert!(matches!(err, ListRepositoryError::DuplicateKey { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_requires_owner_or_guest(groceries: List) {
        let repo = InMemoryListRepository::new();
        repo.insert(&groceries).await.expect("insert");

        let stranger = repo
            .update_content(&groceries.id, &user("mallory"), "hijacked", at(10))
            .await
            .expect("update");
        assert_eq!(stranger, 0);

        repo.add_guest(&groceries.id, &user("bob")).await.expect("add guest");
        let guest = repo
            .update_content(&groceries.id, &user("bob"), "milk,eggs", at(11))
            .await
            .expect("update");
        assert_eq!(guest, 1);

        let stored = repo
            .find_by_id(&groceries.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(stored.content, "milk,eggs");
        assert_eq!(stored.last_changed, at(11));
    }

    #[rstest]
    #[tokio::test]
    async fn guest_set_operations_report_their_effect(groceries: List) {
        let repo = InMemoryListRepository::new();
        repo.insert(&groceries).await.expect("insert");
        let bob = user("bob");

        assert_eq!(
            repo.add_guest(&groceries.id, &bob).await.expect("add"),
            SetMutation::Applied
        );
        assert_eq!(
            repo.add_guest(&groceries.id, &bob).await.expect("add again"),
            SetMutation::Unchanged
        );
        assert_eq!(
            repo.add_guest(&groceries.id, &user("alice")).await.expect("owner"),
            SetMutation::Unchanged
        );
        assert_eq!(
            repo.remove_guest(&groceries.id, &bob).await.expect("remove"),
            SetMutation::Applied
        );
        assert_eq!(
            repo.remove_guest(&groceries.id, &bob).await.expect("remove again"),
            SetMutation::Unchanged
        );
        assert_eq!(
            repo.add_guest(&ListId::generate(), &bob).await.expect("missing"),
            SetMutation::MissingRecord
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_counts_removed_records(groceries: List) {
        let repo = InMemoryListRepository::new();
        repo.insert(&groceries).await.expect("insert");

        assert_eq!(repo.delete(&groceries.id).await.expect("delete"), 1);
        assert_eq!(repo.delete(&groceries.id).await.expect("delete again"), 0);
        assert!(repo.find_by_id(&groceries.id).await.expect("find").is_none());
    }
}
