//! Identity records consumed from the external identity store.
//!
//! The session core does not own user rows; it reads them through
//! [`crate::store::IdentityStore`] to verify credentials and to build token
//! claims. Only [`PublicIdentity`] ever leaves the protocol boundary.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Full identity row -- includes the password hash, so NEVER serialize this
/// outward. Use [`PublicIdentity`] for anything caller-facing.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Role name carried into token claims (e.g. `"admin"`, `"customer"`).
    pub role: String,
    /// Argon2id PHC-formatted password hash.
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe identity representation returned alongside a token pair at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicIdentity {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Identity {
    pub fn to_public(&self) -> PublicIdentity {
        PublicIdentity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}
