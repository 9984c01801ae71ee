//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{access_links, access_records, list_guests, lists};

/// Row struct for reading from the lists table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListRow {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub content: String,
    pub last_changed: DateTime<Utc>,
}

/// Insertable struct for creating list records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lists)]
pub(crate) struct NewListRow<'a> {
    pub id: Uuid,
    pub owner: &'a str,
    pub name: &'a str,
    pub content: &'a str,
    pub last_changed: DateTime<Utc>,
}

/// Insertable struct for guest membership rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = list_guests)]
pub(crate) struct NewListGuestRow<'a> {
    pub list_id: Uuid,
    pub username: &'a str,
}

/// Insertable struct for access records; `created_at` uses the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = access_records)]
pub(crate) struct NewAccessRecordRow<'a> {
    pub username: &'a str,
}

/// Row struct for reading links of one access record.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = access_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccessLinkRow {
    pub list_id: Uuid,
    pub kind: String,
    pub display_name: String,
}

/// Insertable struct for access links.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = access_links)]
pub(crate) struct NewAccessLinkRow<'a> {
    pub username: &'a str,
    pub list_id: Uuid,
    pub kind: &'a str,
    pub display_name: &'a str,
}
