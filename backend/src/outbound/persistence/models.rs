//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::synced_users;

/// Row struct for reading from the synced_users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = synced_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SyncedUserRow {
    #[expect(dead_code, reason = "surrogate key is store-owned and never surfaced")]
    pub id: Uuid,
    pub workos_id: String,
    pub email: String,
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct used for the atomic upsert statement.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = synced_users)]
pub(crate) struct NewSyncedUserRow<'a> {
    pub id: Uuid,
    pub workos_id: &'a str,
    pub email: &'a str,
    pub password: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
