//! In-memory store implementations.
//!
//! Back the protocol tests and single-process embeddings. All session
//! mutations for one store happen under a single lock, which gives the
//! rotate path the same one-winner guarantee the Postgres store gets from
//! its transaction plus conditional update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tessera_core::clock::Clock;
use tessera_core::error::StoreError;
use tessera_core::identity::Identity;
use tessera_core::session::{NewSession, Session};
use tessera_core::store::{IdentityStore, SessionStore};
use tessera_core::types::{DbId, Timestamp};

/// Session store over a `jti`-keyed map.
pub struct MemorySessionStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

struct Inner {
    next_id: DbId,
    // Keyed by jti; jti uniqueness is the table's invariant.
    sessions: HashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner {
                next_id: 1,
                sessions: HashMap::new(),
            }),
        }
    }

    /// Snapshot of every stored session, for assertions in tests.
    pub fn all_sessions(&self) -> Vec<Session> {
        self.inner.lock().unwrap().sessions.values().cloned().collect()
    }

    fn insert_row(inner: &mut Inner, input: NewSession, now: Timestamp) -> Session {
        let session = Session {
            id: inner.next_id,
            user_id: input.user_id,
            jti: input.jti,
            family_id: input.family_id,
            token_hash: input.token_hash,
            replaced_by_jti: None,
            user_agent: input.user_agent,
            ip: input.ip,
            expires_at: input.expires_at,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.next_id += 1;
        inner.sessions.insert(session.jti.clone(), session.clone());
        session
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: NewSession) -> Result<Session, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        if inner.sessions.contains_key(&input.jti) {
            return Err(StoreError::Unavailable(format!(
                "duplicate jti {}",
                input.jti
            )));
        }
        Ok(Self::insert_row(&mut inner, input, now))
    }

    async fn find_by_jti(&self, jti: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.inner.lock().unwrap().sessions.get(jti).cloned())
    }

    async fn revoke(&self, jti: &str, replaced_by_jti: Option<&str>) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        if let Some(session) = inner.sessions.get_mut(jti) {
            if session.revoked_at.is_none() {
                session.revoked_at = Some(now);
                session.replaced_by_jti = replaced_by_jti.map(str::to_string);
                session.updated_at = now;
            }
        }
        Ok(())
    }

    async fn revoke_family(&self, family_id: &str) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        let mut revoked = 0;
        for session in inner.sessions.values_mut() {
            if session.family_id == family_id && session.revoked_at.is_none() {
                session.revoked_at = Some(now);
                session.updated_at = now;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();
        let mut revoked = 0;
        for session in inner.sessions.values_mut() {
            if session.user_id == user_id && session.revoked_at.is_none() {
                session.revoked_at = Some(now);
                session.updated_at = now;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn rotate(
        &self,
        old_jti: &str,
        replacement: NewSession,
    ) -> Result<Session, StoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();

        // Conditional revoke-old: only an unrevoked row can be rotated, so
        // of two racing rotations exactly one gets past this check.
        match inner.sessions.get_mut(old_jti) {
            Some(old) if old.revoked_at.is_none() => {
                old.revoked_at = Some(now);
                old.replaced_by_jti = Some(replacement.jti.clone());
                old.updated_at = now;
            }
            _ => return Err(StoreError::RotationConflict(old_jti.to_string())),
        }

        Ok(Self::insert_row(&mut inner, replacement, now))
    }
}

/// Identity store over an email-keyed map. Rows are provisioned directly by
/// the embedding (or test) that owns them.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<HashMap<String, Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an identity row.
    pub fn insert(&self, identity: Identity) {
        self.inner
            .lock()
            .unwrap()
            .insert(identity.email.clone(), identity);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.inner.lock().unwrap().get(email).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .values()
            .find(|identity| identity.id == id)
            .cloned())
    }
}
