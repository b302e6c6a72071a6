//! Mapper for the `sessions` table.

use sqlx::FromRow;
use tessera_core::session::Session;
use tessera_core::types::{DbId, Timestamp};

/// A session row exactly as stored. One row per issued refresh token; rows
/// are retained forever (audit trail and reuse-detection basis), so a
/// select by `jti` can return rotated, revoked, or expired rows.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub jti: String,
    pub family_id: String,
    pub token_hash: String,
    pub replaced_by_jti: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            user_id: row.user_id,
            jti: row.jti,
            family_id: row.family_id,
            token_hash: row.token_hash,
            replaced_by_jti: row.replaced_by_jti,
            user_agent: row.user_agent,
            ip: row.ip,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
