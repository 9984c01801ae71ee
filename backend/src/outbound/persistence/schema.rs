//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// List Store: one row per list.
    lists (id) {
        /// Primary key: UUID v7 identifier.
        id -> Uuid,
        /// Owning username.
        owner -> Varchar,
        /// Display name (max 128 characters).
        name -> Varchar,
        /// Free-form list content.
        content -> Text,
        /// Timestamp of the last content change.
        last_changed -> Timestamptz,
    }
}

diesel::table! {
    /// Guest membership of lists, deleted with the list.
    list_guests (list_id, username) {
        list_id -> Uuid,
        username -> Varchar,
        /// Insertion order.
        position -> Int8,
    }
}

diesel::table! {
    /// Access Index Store: one row per registered user.
    access_records (username) {
        username -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Owned and shared links held by each access record.
    ///
    /// The primary key keeps a list id in at most one of a user's link-sets.
    access_links (username, list_id) {
        username -> Varchar,
        list_id -> Uuid,
        /// Either `owned` or `shared`.
        kind -> Varchar,
        /// Display name captured when the link was written.
        display_name -> Varchar,
        /// Insertion order.
        position -> Int8,
    }
}

diesel::joinable!(list_guests -> lists (list_id));
diesel::joinable!(access_links -> access_records (username));

diesel::allow_tables_to_appear_in_same_query!(lists, list_guests, access_records, access_links);
