//! PostgreSQL-backed `AccessIndexRepository` implementation using Diesel ORM.
//!
//! Each link is its own `access_links` row keyed by `(username, list_id)`.
//! Pushing a link is one `INSERT .. ON CONFLICT DO NOTHING` and pulling one
//! is one `DELETE`, so concurrent link changes for the same user never
//! overwrite each other.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{AccessIndexRepository, AccessIndexRepositoryError};
use crate::domain::{AccessRecord, LinkKind, ListId, ListLink, ListName, SetMutation, Username};

use super::error_mapping::{DbFailure, bounded, classify};
use super::models::{AccessLinkRow, NewAccessLinkRow, NewAccessRecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::{access_links, access_records};

/// Diesel-backed implementation of the `AccessIndexRepository` port.
#[derive(Clone)]
pub struct DieselAccessIndexRepository {
    pool: DbPool,
}

impl DieselAccessIndexRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccessIndexRepositoryError {
    AccessIndexRepositoryError::connection(error.into_message())
}

fn map_failure(failure: DbFailure) -> AccessIndexRepositoryError {
    match failure {
        DbFailure::Connection(message) => AccessIndexRepositoryError::connection(message),
        DbFailure::UniqueViolation => {
            AccessIndexRepositoryError::query("unexpected unique violation")
        }
        DbFailure::ForeignKeyViolation => {
            AccessIndexRepositoryError::query("unexpected foreign key violation")
        }
        DbFailure::Query(message) => AccessIndexRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AccessIndexRepositoryError {
    map_failure(classify(error))
}

fn timed_out(operation: &'static str) -> AccessIndexRepositoryError {
    AccessIndexRepositoryError::timeout(operation)
}

fn rows_to_record(
    username: Username,
    rows: Vec<AccessLinkRow>,
) -> Result<AccessRecord, AccessIndexRepositoryError> {
    let mut record = AccessRecord::empty(username);
    for row in rows {
        let kind: LinkKind = row.kind.parse().map_err(|_| {
            AccessIndexRepositoryError::query(format!(
                "stored link to {} has invalid kind",
                row.list_id
            ))
        })?;
        let display_name = ListName::new(&row.display_name).map_err(|_| {
            AccessIndexRepositoryError::query(format!(
                "stored link to {} has invalid display name",
                row.list_id
            ))
        })?;
        let link = ListLink::new(ListId::from_uuid(row.list_id), display_name);
        match kind {
            LinkKind::Owned => record.owned.push(link),
            LinkKind::Shared => record.shared.push(link),
        }
    }
    Ok(record)
}

async fn record_exists(
    conn: &mut AsyncPgConnection,
    username: &Username,
) -> Result<bool, AccessIndexRepositoryError> {
    diesel::select(exists(access_records::table.find(username.as_ref())))
        .get_result(conn)
        .await
        .map_err(map_diesel_error)
}

#[async_trait]
impl AccessIndexRepository for DieselAccessIndexRepository {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<AccessRecord>, AccessIndexRepositoryError> {
        bounded(self.pool.operation_timeout(), "find_by_username", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;

            // One snapshot for the record and its links.
            let found = conn
                .build_transaction()
                .read_only()
                .repeatable_read()
                .run(|conn| {
                    async move {
                        let registered: bool =
                            diesel::select(exists(access_records::table.find(username.as_ref())))
                                .get_result(conn)
                                .await?;
                        if !registered {
                            return Ok(None);
                        }
                        let rows: Vec<AccessLinkRow> = access_links::table
                            .filter(access_links::username.eq(username.as_ref()))
                            .order_by(access_links::position)
                            .select(AccessLinkRow::as_select())
                            .load(conn)
                            .await?;
                        Ok::<_, diesel::result::Error>(Some(rows))
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)?;

            found
                .map(|rows| rows_to_record(username.clone(), rows))
                .transpose()
        })
        .await
    }

    async fn insert(&self, record: &AccessRecord) -> Result<(), AccessIndexRepositoryError> {
        bounded(self.pool.operation_timeout(), "insert", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let username = record.username.as_ref();
            let links: Vec<NewAccessLinkRow<'_>> = [LinkKind::Owned, LinkKind::Shared]
                .into_iter()
                .flat_map(|kind| {
                    record.links(kind).iter().map(move |link| NewAccessLinkRow {
                        username,
                        list_id: *link.id.as_uuid(),
                        kind: kind.as_str(),
                        display_name: link.display_name.as_ref(),
                    })
                })
                .collect();

            conn.transaction(|conn| {
                async move {
                    diesel::insert_into(access_records::table)
                        .values(&NewAccessRecordRow { username })
                        .execute(conn)
                        .await?;
                    if !links.is_empty() {
                        diesel::insert_into(access_links::table)
                            .values(&links)
                            .execute(conn)
                            .await?;
                    }
                    Ok::<_, diesel::result::Error>(())
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match classify(err) {
                DbFailure::UniqueViolation => {
                    AccessIndexRepositoryError::duplicate_user(username)
                }
                other => map_failure(other),
            })
        })
        .await
    }

    async fn push_link(
        &self,
        username: &Username,
        kind: LinkKind,
        link: &ListLink,
    ) -> Result<SetMutation, AccessIndexRepositoryError> {
        bounded(self.pool.operation_timeout(), "push_link", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let inserted = diesel::insert_into(access_links::table)
                .values(&NewAccessLinkRow {
                    username: username.as_ref(),
                    list_id: *link.id.as_uuid(),
                    kind: kind.as_str(),
                    display_name: link.display_name.as_ref(),
                })
                .on_conflict_do_nothing()
                .execute(&mut conn)
                .await;

            match inserted {
                Ok(0) => Ok(SetMutation::Unchanged),
                Ok(_) => Ok(SetMutation::Applied),
                Err(err) => match classify(err) {
                    DbFailure::ForeignKeyViolation => Ok(SetMutation::MissingRecord),
                    other => Err(map_failure(other)),
                },
            }
        })
        .await
    }

    async fn pull_link(
        &self,
        username: &Username,
        kind: LinkKind,
        id: &ListId,
    ) -> Result<SetMutation, AccessIndexRepositoryError> {
        bounded(self.pool.operation_timeout(), "pull_link", timed_out, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let removed = diesel::delete(
                access_links::table
                    .filter(access_links::username.eq(username.as_ref()))
                    .filter(access_links::list_id.eq(*id.as_uuid()))
                    .filter(access_links::kind.eq(kind.as_str())),
            )
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

            if removed > 0 {
                return Ok(SetMutation::Applied);
            }
            Ok(if record_exists(&mut conn, username).await? {
                SetMutation::Unchanged
            } else {
                SetMutation::MissingRecord
            })
        })
        .await
    }
}
