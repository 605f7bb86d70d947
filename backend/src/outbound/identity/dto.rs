//! Wire DTOs for the identity provider's user-management API.

use serde::Deserialize;

/// Subset of the provider's user object this adapter cares about.
///
/// Only the identifier is read: the reconciliation handlers apply the
/// event's own payload, and decoding the ID lets the adapter detect a
/// middlebox answering 200 with the wrong body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderUserDto {
    pub id: String,
}
