//! The Session record: one row per issued refresh token.
//!
//! Sessions are created on login (fresh family) or rotation (same family),
//! mutated only to set `revoked_at`/`replaced_by_jti`, and never deleted --
//! revoked rows are the audit trail that makes reuse detection possible.

use crate::types::{DbId, Timestamp};

/// A persisted refresh-token session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: DbId,
    /// Owning identity (foreign reference, not owned by this core).
    pub user_id: DbId,
    /// Unique identifier of the refresh token this row represents. Never
    /// reused, even across revoked/expired sessions.
    pub jti: String,
    /// Shared by every token descended from one login; stable across
    /// rotations.
    pub family_id: String,
    /// SHA-256 hex digest of the signed refresh token. The raw token is
    /// never persisted.
    pub token_hash: String,
    /// Set when this session is superseded by rotation; always references a
    /// `jti` in the same family.
    pub replaced_by_jti: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub expires_at: Timestamp,
    /// Once set, the session is permanently inert.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Derived lifecycle state of a session. `Expired` is computed from
/// `expires_at`, not stored. All non-`Active` states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Revoked with a replacement chained in -- natural end-of-life.
    Rotated,
    /// Revoked with no replacement -- logout or theft response.
    Revoked,
    Expired,
}

impl Session {
    /// Derive the lifecycle state at the given instant.
    pub fn state(&self, now: Timestamp) -> SessionState {
        if self.revoked_at.is_some() {
            if self.replaced_by_jti.is_some() {
                SessionState::Rotated
            } else {
                SessionState::Revoked
            }
        } else if self.expires_at <= now {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    /// A session is usable iff it is not revoked and not past expiry.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.state(now) == SessionState::Active
    }
}

/// DTO for creating a session row. Timestamps and the row id are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub jti: String,
    pub family_id: String,
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub expires_at: Timestamp,
}
