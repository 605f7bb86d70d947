//! Identity webhook user-sync backend library modules.
//!
//! The crate keeps a local user projection consistent with a hosted identity
//! provider's webhook event stream: `domain` holds the reconciliation core,
//! `inbound` the HTTP boundary, and `outbound` the PostgreSQL and provider
//! API adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
