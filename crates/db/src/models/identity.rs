//! Mapper for the `users` table (read-only from this crate's perspective).

use sqlx::FromRow;
use tessera_core::identity::Identity;
use tessera_core::types::{DbId, Timestamp};

/// A user row as read for credential verification. Contains the password
/// hash -- never serialize outward.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
