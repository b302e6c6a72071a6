//! Persistence boundaries.
//!
//! Pure contracts, no policy: the rotation/reuse rules live in the session
//! manager, not here. All mutations are conditional updates scoped by
//! `jti`/`family_id`/`user_id` predicates so concurrent writers cannot
//! lose updates to full-row rewrites. Session rows are never deleted.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::identity::Identity;
use crate::session::{NewSession, Session};
use crate::types::DbId;

/// Durable storage for session rows, keyed by `jti`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session row, returning it with id and timestamps set.
    async fn create(&self, input: NewSession) -> Result<Session, StoreError>;

    /// Point lookup by token identifier, revoked and expired rows included.
    async fn find_by_jti(&self, jti: &str) -> Result<Option<Session>, StoreError>;

    /// Mark one session revoked, optionally chaining in its replacement.
    /// Already-revoked rows are left untouched.
    async fn revoke(&self, jti: &str, replaced_by_jti: Option<&str>) -> Result<(), StoreError>;

    /// Mark every session in a family revoked, regardless of chain position.
    /// Returns the number of rows newly revoked.
    async fn revoke_family(&self, family_id: &str) -> Result<u64, StoreError>;

    /// Mark every session of a user revoked, across all families. Returns
    /// the number of rows newly revoked.
    async fn revoke_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Atomically revoke the presented session (chaining in the replacement
    /// jti) and insert its successor. A concurrent reader never observes
    /// both rows active, nor the old row rotated without the new one.
    ///
    /// The revoke-old step is conditional on the row still being
    /// unrevoked; when two rotations race on the same `jti`, exactly one
    /// wins and the loser gets [`StoreError::RotationConflict`].
    async fn rotate(&self, old_jti: &str, replacement: NewSession)
        -> Result<Session, StoreError>;
}

/// Read-only view of the external identity store. This core consumes it for
/// credential verification and claim building only; user lifecycle
/// management belongs to the collaborator that owns the rows.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Identity>, StoreError>;
}
