//! PostgreSQL persistence adapter for the user store port.

mod diesel_user_store;
mod models;
mod pool;
pub mod schema;

pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolError};
