//! PostgreSQL-backed `UserStore` implementation using Diesel.
//!
//! Both mutations are single atomic statements. The upsert uses
//! `INSERT .. ON CONFLICT (workos_id) DO UPDATE` so concurrent duplicate
//! deliveries for the same provider user converge to one row at the storage
//! layer; the delete is a plain keyed `DELETE` whose affected-row count lets
//! the domain distinguish "removed" from "was already gone".

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::user::{SyncedUser, WorkosUserId};

use super::models::{NewSyncedUserRow, SyncedUserRow};
use super::pool::{DbPool, PoolError};
use super::schema::synced_users;

/// Diesel-backed implementation of the `UserStore` port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain user store errors.
fn map_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user store errors.
fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserStoreError::query("database error"),
        DieselError::NotFound => UserStoreError::query("record not found"),
        _ => UserStoreError::query("database error"),
    }
}

/// Convert a database row to the domain representation.
fn row_to_user(row: SyncedUserRow) -> Result<SyncedUser, UserStoreError> {
    let workos_id = WorkosUserId::new(&row.workos_id)
        .map_err(|err| UserStoreError::query(format!("stored workos id is invalid: {err}")))?;

    Ok(SyncedUser {
        workos_id,
        email: row.email,
        password: row.password,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_by_workos_id(
        &self,
        workos_id: &WorkosUserId,
    ) -> Result<Option<SyncedUser>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<SyncedUserRow> = synced_users::table
            .filter(synced_users::workos_id.eq(workos_id.as_str()))
            .select(SyncedUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn upsert(&self, user: &SyncedUser) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewSyncedUserRow {
            id: Uuid::new_v4(),
            workos_id: user.workos_id.as_str(),
            email: user.email.as_str(),
            password: user.password.as_deref(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        // created_at is deliberately not in the update set: the provider's
        // creation timestamp is immutable, and the existing row keeps its
        // original insert-time value on replays.
        diesel::insert_into(synced_users::table)
            .values(&row)
            .on_conflict(synced_users::workos_id)
            .do_update()
            .set((
                synced_users::email.eq(excluded(synced_users::email)),
                synced_users::password.eq(excluded(synced_users::password)),
                synced_users::updated_at.eq(excluded(synced_users::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_by_workos_id(&self, workos_id: &WorkosUserId) -> Result<u64, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted =
            diesel::delete(synced_users::table.filter(synced_users::workos_id.eq(workos_id.as_str())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(deleted as u64)
    }
}
