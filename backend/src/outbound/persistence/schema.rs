//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; regenerate with `diesel print-schema` when migrations change.

diesel::table! {
    /// Synchronized user projection of the identity provider.
    ///
    /// Rows are owned exclusively by the webhook reconciliation pipeline.
    /// The unique constraint on `workos_id` is what makes concurrent
    /// duplicate deliveries converge without application-level locking.
    synced_users (id) {
        /// Primary key: store-owned UUID v4.
        id -> Uuid,
        /// Identity-provider user ID; unique join key to the event stream.
        workos_id -> Varchar,
        /// Email address; may change over the user's lifetime upstream.
        email -> Varchar,
        /// Local credential; always NULL for provider-managed users.
        password -> Nullable<Varchar>,
        /// Provider-side creation timestamp.
        created_at -> Timestamptz,
        /// Effective timestamp of the last applied event.
        updated_at -> Timestamptz,
    }
}
