//! The rotation and reuse-detection protocol.
//!
//! [`SessionManager`] ties the codec, the credential verifier, and the
//! stores together: login issuance, refresh rotation, reuse-triggered
//! family revocation, and logout (single / all). Each operation is an
//! independent unit of work driven by one inbound request; every failure is
//! returned as a typed [`AuthError`], never panicked or swallowed upward.

use std::sync::Arc;

use serde::Serialize;
use tessera_core::clock::Clock;
use tessera_core::error::{AuthError, StoreError};
use tessera_core::identity::PublicIdentity;
use tessera_core::session::NewSession;
use tessera_core::store::{IdentityStore, SessionStore};
use tessera_core::types::DbId;

use crate::password::verify_password;
use crate::token::{generate_id, hash_token, AccessClaims, TokenCodec};

/// Optional request provenance recorded on each session row.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// A fresh access + refresh pair returned by rotation.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Successful login outcome: the pair plus the public identity fields.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub identity: PublicIdentity,
}

/// Issues, rotates, and revokes session credentials.
pub struct SessionManager {
    identities: Arc<dyn IdentityStore>,
    sessions: Arc<dyn SessionStore>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        sessions: Arc<dyn SessionStore>,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            sessions,
            codec,
            clock,
        }
    }

    /// Authenticate with email + password and start a new token family.
    ///
    /// Unknown email and wrong password collapse into the same generic
    /// [`AuthError::InvalidCredentials`]; nothing reveals which field was
    /// wrong.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        provenance: Provenance,
    ) -> Result<LoginOutcome, AuthError> {
        let identity = self
            .identities
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &identity.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let jti = generate_id();
        let family_id = generate_id();

        let refresh_token = self.codec.sign_refresh(
            identity.id,
            &identity.email,
            &identity.role,
            &jti,
            &family_id,
            now,
        )?;

        self.sessions
            .create(NewSession {
                user_id: identity.id,
                jti,
                family_id,
                token_hash: hash_token(&refresh_token),
                user_agent: provenance.user_agent,
                ip: provenance.ip,
                expires_at: now + self.codec.refresh_ttl(),
            })
            .await?;

        let access_token =
            self.codec
                .sign_access(identity.id, &identity.email, &identity.role, now)?;

        tracing::debug!(user_id = identity.id, "login issued new session family");

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl_secs(),
            identity: identity.to_public(),
        })
    }

    /// Exchange a valid refresh token for a fresh pair, rotating the
    /// session. Presenting a token whose session is already rotated or
    /// revoked is treated as evidence of theft: the entire family is
    /// revoked before the call fails.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        provenance: Provenance,
    ) -> Result<TokenPair, AuthError> {
        let claims = self.codec.verify_refresh(refresh_token)?;
        let now = self.clock.now();

        let session = self.sessions.find_by_jti(&claims.jti).await?;

        let session = match session {
            // A verifiable token with no live session row behind it should
            // not be presentable: either it was rotated away and is being
            // replayed, or it was revoked by logout. One compromised link
            // invalidates the whole lineage.
            None => return self.reuse_detected(&claims.family_id).await,
            Some(s) if s.revoked_at.is_some() => {
                return self.reuse_detected(&claims.family_id).await;
            }
            Some(s) => s,
        };

        if !session.is_usable(now) {
            // Administratively expired, not a theft signal: clean up this
            // one row and leave the rest of the family alone.
            self.sessions.revoke(&claims.jti, None).await?;
            return Err(AuthError::ExpiredToken);
        }

        let new_jti = generate_id();
        let new_refresh = self.codec.sign_refresh(
            claims.sub,
            &claims.email,
            &claims.role,
            &new_jti,
            &claims.family_id,
            now,
        )?;

        let rotated = self
            .sessions
            .rotate(
                &claims.jti,
                NewSession {
                    user_id: claims.sub,
                    jti: new_jti,
                    family_id: claims.family_id.clone(),
                    token_hash: hash_token(&new_refresh),
                    user_agent: provenance.user_agent,
                    ip: provenance.ip,
                    expires_at: now + self.codec.refresh_ttl(),
                },
            )
            .await;

        match rotated {
            Ok(_) => {}
            // Lost a race against a concurrent rotation of the same jti --
            // the token was duplicated and replayed. Same response as any
            // other reuse.
            Err(StoreError::RotationConflict(_)) => {
                return self.reuse_detected(&claims.family_id).await;
            }
            Err(e) => return Err(e.into()),
        }

        let access_token = self
            .codec
            .sign_access(claims.sub, &claims.email, &claims.role, now)?;

        tracing::debug!(user_id = claims.sub, "refresh token rotated");

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh,
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    /// Revoke exactly the session behind the presented refresh token.
    ///
    /// Idempotent by design: a missing or unverifiable token still reports
    /// success, since the goal -- that session being unusable -- is either
    /// already true or unverifiable-but-harmless. Only store faults
    /// propagate.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        match self.codec.verify_refresh(token) {
            Ok(claims) => {
                self.sessions.revoke(&claims.jti, None).await?;
            }
            Err(_) => {
                tracing::debug!("logout with unverifiable refresh token, ignoring");
            }
        }

        Ok(())
    }

    /// Revoke every session of the user, across all families ("sign out
    /// everywhere"). Returns the number of sessions newly revoked.
    pub async fn logout_all(&self, user_id: DbId) -> Result<u64, AuthError> {
        let revoked = self.sessions.revoke_all_for_user(user_id).await?;
        tracing::debug!(user_id, revoked, "revoked all sessions for user");
        Ok(revoked)
    }

    /// Verify an access token and hand back its claims, for downstream
    /// authorization middleware. Purely stateless: no session lookup, so a
    /// revoked session's access token stays valid until its own short
    /// expiry.
    pub fn verify_access_token(&self, access_token: &str) -> Result<AccessClaims, AuthError> {
        self.codec.verify_access(access_token)
    }

    /// Look up the public identity fields for a verified subject id.
    pub async fn identity(&self, user_id: DbId) -> Result<PublicIdentity, AuthError> {
        let identity = self
            .identities
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound {
                entity: "identity",
                id: user_id,
            })?;
        Ok(identity.to_public())
    }

    /// Containment for a reuse signal: kill the whole family, then reject.
    async fn reuse_detected<T>(&self, family_id: &str) -> Result<T, AuthError> {
        let revoked = self.sessions.revoke_family(family_id).await?;
        tracing::warn!(
            family_id,
            revoked,
            "refresh token reuse detected, family revoked"
        );
        Err(AuthError::RevokedSession)
    }
}
