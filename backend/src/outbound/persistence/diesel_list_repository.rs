//! PostgreSQL-backed `ListRepository` implementation using Diesel ORM.
//!
//! Guest membership lives in `list_guests`, so adding or removing a guest is
//! a single-row insert or delete and never rewrites the list row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ListRepository, ListRepositoryError};
use crate::domain::{List, ListId, ListName, SetMutation, Username};

use super::error_mapping::{DbFailure, bounded, classify, record_count};
use super::models::{ListRow, NewListGuestRow, NewListRow};
use super::pool::{DbPool, PoolError};
use super::schema::{list_guests, lists};

/// Diesel-backed implementation of the `ListRepository` port.
#[derive(Clone)]
pub struct DieselListRepository {
    pool: DbPool,
}

impl DieselListRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ListRepositoryError {
    ListRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> ListRepositoryError {
    match classify(error) {
        DbFailure::Connection(message) => ListRepositoryError::connection(message),
        DbFailure::UniqueViolation => ListRepositoryError::query("unexpected unique violation"),
        DbFailure::ForeignKeyViolation => {
            ListRepositoryError::query("unexpected foreign key violation")
        }
        DbFailure::Query(message) => ListRepositoryError::query(message),
    }
}

fn timed_out(operation: &'static str) -> ListRepositoryError {
    ListRepositoryError::timeout(operation)
}

fn row_to_list(row: ListRow, guests: Vec<String>) -> Result<List, ListRepositoryError> {
    let corrupt = |field: &str| {
        ListRepositoryError::query(format!("stored list {} has invalid {field}", row.id))
    };
    let owner = Username::new(row.owner.clone()).map_err(|_| corrupt("owner"))?;
    let name = ListName::new(&row.name).map_err(|_| corrupt("name"))?;
    let guests = guests
        .into_iter()
        .map(Username::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| corrupt("guest"))?;
    Ok(List {
        id: ListId::from_uuid(row.id),
        owner,
        guests,
        name,
        content: row.content,
        last_changed: row.last_changed,
    })
}

async fn list_exists(conn: &mut AsyncPgConnection, id: Uuid) -> Result<bool, ListRepositoryError> {
    diesel::select(exists(lists::table.find(id)))
        .get_result(conn)
        .await
        .map_err(map_diesel_error)
}

#[async_trait]
impl ListRepository for DieselListRepository {
    async fn find_by_id(&self, id: &ListId) -> Result<Option<List>, ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "find_by_id", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let uuid = *id.as_uuid();

            // The list row and its guests come from one snapshot.
            let found = conn
                .build_transaction()
                .read_only()
                .repeatable_read()
                .run(|conn| {
                    async move {
                        let Some(row) = lists::table
                            .find(uuid)
                            .select(ListRow::as_select())
                            .first(conn)
                            .await
                            .optional()?
                        else {
                            return Ok(None);
                        };
                        let guests: Vec<String> = list_guests::table
                            .filter(list_guests::list_id.eq(uuid))
                            .order_by(list_guests::position)
                            .select(list_guests::username)
                            .load(conn)
                            .await?;
                        Ok::<_, diesel::result::Error>(Some((row, guests)))
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)?;

            found
                .map(|(row, guests)| row_to_list(row, guests))
                .transpose()
        })
        .await
    }

    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "insert", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let uuid = *list.id.as_uuid();
            let row = NewListRow {
                id: uuid,
                owner: list.owner.as_ref(),
                name: list.name.as_ref(),
                content: &list.content,
                last_changed: list.last_changed,
            };
            let guests: Vec<NewListGuestRow<'_>> = list
                .guests
                .iter()
                .map(|guest| NewListGuestRow {
                    list_id: uuid,
                    username: guest.as_ref(),
                })
                .collect();

            conn.transaction(|conn| {
                async move {
                    diesel::insert_into(lists::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    if !guests.is_empty() {
                        diesel::insert_into(list_guests::table)
                            .values(&guests)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(())
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match classify(err) {
                DbFailure::UniqueViolation => ListRepositoryError::duplicate_key(list.id.to_string()),
                DbFailure::Connection(message) => ListRepositoryError::connection(message),
                DbFailure::ForeignKeyViolation => {
                    ListRepositoryError::query("unexpected foreign key violation")
                }
                DbFailure::Query(message) => ListRepositoryError::query(message),
            })
        })
        .await
    }

    async fn update_content(
        &self,
        id: &ListId,
        editor: &Username,
        content: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<u64, ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "update_content", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let uuid = *id.as_uuid();
            let editor_is_guest = exists(
                list_guests::table
                    .filter(list_guests::list_id.eq(uuid))
                    .filter(list_guests::username.eq(editor.as_ref())),
            );

            let updated = diesel::update(
                lists::table
                    .filter(lists::id.eq(uuid))
                    .filter(lists::owner.eq(editor.as_ref()).or(editor_is_guest)),
            )
            .set((
                lists::content.eq(content),
                lists::last_changed.eq(changed_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            Ok(record_count(updated))
        })
        .await
    }

    async fn add_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "add_guest", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let inserted = diesel::insert_into(list_guests::table)
                .values(&NewListGuestRow {
                    list_id: *id.as_uuid(),
                    username: guest.as_ref(),
                })
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await;

            match inserted {
                Ok(0) => Ok(SetMutation::Unchanged),
                Ok(_) => Ok(SetMutation::Applied),
                Err(err) => match classify(err) {
                    DbFailure::ForeignKeyViolation => Ok(SetMutation::MissingRecord),
                    DbFailure::Connection(message) => Err(ListRepositoryError::connection(message)),
                    DbFailure::UniqueViolation => Ok(SetMutation::Unchanged),
                    DbFailure::Query(message) => Err(ListRepositoryError::query(message)),
                },
            }
        })
        .await
    }

    async fn remove_guest(
        &self,
        id: &ListId,
        guest: &Username,
    ) -> Result<SetMutation, ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "remove_guest", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let uuid = *id.as_uuid();
            let removed = diesel::delete(
                list_guests::table
                    .filter(list_guests::list_id.eq(uuid))
                    .filter(list_guests::username.eq(guest.as_ref())),
            )
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            if removed > 0 {
                return Ok(SetMutation::Applied);
            }
            Ok(if list_exists(&mut conn, uuid).await? {
                SetMutation::Unchanged
            } else {
                SetMutation::MissingRecord
            })
        })
        .await
    }

    async fn delete(&self, id: &ListId) -> Result<u64, ListRepositoryError> {
        bounded(self.pool.operation_timeout(), "delete", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let deleted = diesel::delete(lists::table.find(*id.as_uuid()))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(record_count(deleted))
        })
        .await
    }
}
