//! In-memory Access Index Store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::POISONED;
use crate::domain::ports::{AccessIndexRepository, AccessIndexRepositoryError};
use crate::domain::{AccessRecord, LinkKind, ListId, ListLink, SetMutation, Username};

/// Access records keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryAccessIndexRepository {
    records: Mutex<HashMap<Username, AccessRecord>>,
}

impl InMemoryAccessIndexRepository {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<Username, AccessRecord>>, AccessIndexRepositoryError> {
        self.records
            .lock()
            .map_err(|_| AccessIndexRepositoryError::query(POISONED))
    }
}

fn links_mut(record: &mut AccessRecord, kind: LinkKind) -> &mut Vec<ListLink> {
    match kind {
        LinkKind::Owned => &mut record.owned,
        LinkKind::Shared => &mut record.shared,
    }
}

#[async_trait]
impl AccessIndexRepository for InMemoryAccessIndexRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<AccessRecord>, AccessIndexRepositoryError> {
        Ok(self.guard()?.get(username).cloned())
    }

    async fn insert(&self, record: &AccessRecord) -> Result<(), AccessIndexRepositoryError> {
        let mut records = self.guard()?;
        if records.contains_key(&record.username) {
            return Err(AccessIndexRepositoryError::duplicate_user(
                record.username.to_string(),
            ));
        }
        records.insert(record.username.clone(), record.clone());
        Ok(())
    }

    async fn push_link(
        &self,
        username: &Username,
        kind: LinkKind,
        link: &ListLink,
    ) -> Result<SetMutation, AccessIndexRepositoryError> {
        let mut records = self.guard()?;
        let Some(record) = records.get_mut(username) else {
            return Ok(SetMutation::MissingRecord);
        };
        if record.references(&link.id) {
            return Ok(SetMutation::Unchanged);
        }
        links_mut(record, kind).push(link.clone());
        Ok(SetMutation::Applied)
    }

    async fn pull_link(
        &self,
        username: &Username,
        kind: LinkKind,
        id: &ListId,
    ) -> Result<SetMutation, AccessIndexRepositoryError> {
        let mut records = self.guard()?;
        let Some(record) = records.get_mut(username) else {
            return Ok(SetMutation::MissingRecord);
        };
        let links = links_mut(record, kind);
        let before = links.len();
        links.retain(|link| &link.id != id);
        Ok(if links.len() == before {
            SetMutation::Unchanged
        } else {
            SetMutation::Applied
        })
    }
}
