//! Signing and verification of the two token classes.
//!
//! Both classes are HS256 JWTs with an expiry claim. Access tokens are
//! stateless and short-lived; refresh tokens carry the rotation identifiers
//! (`jti`, `family_id`) and are paired 1:1 with a persisted session row.
//! The two classes are signed with separate secrets, so one can never be
//! replayed as the other.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tessera_core::error::AuthError;
use tessera_core::ttl::parse_ttl;
use tessera_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub email: String,
    /// Role name consumed by downstream authorization (e.g. `"admin"`).
    pub role: String,
    /// Issued-at (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration (UTC Unix timestamp).
    pub exp: i64,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: DbId,
    pub email: String,
    pub role: String,
    /// Unique token identifier; keys the session row.
    pub jti: String,
    /// Lineage identifier, stable across rotations.
    pub family_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing configuration. Secrets are per-class; lifetimes come from
/// `"30d"`-style specs validated at construction.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

fn default_access_ttl() -> Duration {
    Duration::minutes(15)
}

fn default_refresh_ttl() -> Duration {
    Duration::days(30)
}

impl TokenConfig {
    /// Build a config with the default lifetimes (access 15m, refresh 30d).
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: default_access_ttl(),
            refresh_ttl: default_refresh_ttl(),
        }
    }

    /// Load token configuration from environment variables.
    ///
    /// | Env Var              | Required | Default |
    /// |----------------------|----------|---------|
    /// | `JWT_ACCESS_SECRET`  | **yes**  | --      |
    /// | `JWT_REFRESH_SECRET` | **yes**  | --      |
    /// | `JWT_ACCESS_TTL`     | no       | `15m`   |
    /// | `JWT_REFRESH_TTL`    | no       | `30d`   |
    ///
    /// Malformed TTL specs fall back to the default with a warning.
    ///
    /// # Panics
    ///
    /// Panics if either secret is not set or is empty.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("JWT_ACCESS_SECRET")
            .expect("JWT_ACCESS_SECRET must be set in the environment");
        assert!(!access_secret.is_empty(), "JWT_ACCESS_SECRET must not be empty");

        let refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .expect("JWT_REFRESH_SECRET must be set in the environment");
        assert!(
            !refresh_secret.is_empty(),
            "JWT_REFRESH_SECRET must not be empty"
        );

        let access_ttl = match std::env::var("JWT_ACCESS_TTL").ok().as_deref() {
            Some(spec) => parse_ttl(spec).unwrap_or_else(|| {
                tracing::warn!(spec, "unparsable JWT_ACCESS_TTL, using default 15m");
                default_access_ttl()
            }),
            None => default_access_ttl(),
        };

        let refresh_ttl = match std::env::var("JWT_REFRESH_TTL").ok().as_deref() {
            Some(spec) => parse_ttl(spec).unwrap_or_else(|| {
                tracing::warn!(spec, "unparsable JWT_REFRESH_TTL, using default 30d");
                default_refresh_ttl()
            }),
            None => default_refresh_ttl(),
        };

        Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        }
    }
}

/// Generate a fresh token identifier (`jti`) or family identifier: 32 hex
/// chars, unique for the lifetime of the system.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// SHA-256 hex digest of a signed token. This digest, never the raw token,
/// is what gets persisted on the session row.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Signs and verifies both token classes with separated keys.
pub struct TokenCodec {
    access_enc: EncodingKey,
    access_dec: DecodingKey,
    refresh_enc: EncodingKey,
    refresh_dec: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access_enc: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_dec: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_enc: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_dec: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Refresh-token lifetime; also the session row's expiry window.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Access-token lifetime in seconds, for `expires_in`-style responses.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Sign an access token for the subject. Stateless: nothing is
    /// persisted, and the token stays valid until its own expiry even if
    /// the owning session is revoked (bounded staleness window).
    pub fn sign_access(
        &self,
        sub: DbId,
        email: &str,
        role: &str,
        now: Timestamp,
    ) -> Result<String, AuthError> {
        let claims = AccessClaims {
            sub,
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.access_enc)
            .map_err(|e| AuthError::Internal(format!("access token signing failed: {e}")))
    }

    /// Sign a refresh token carrying the rotation identifiers.
    pub fn sign_refresh(
        &self,
        sub: DbId,
        email: &str,
        role: &str,
        jti: &str,
        family_id: &str,
        now: Timestamp,
    ) -> Result<String, AuthError> {
        let claims = RefreshClaims {
            sub,
            email: email.to_string(),
            role: role.to_string(),
            jti: jti.to_string(),
            family_id: family_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_enc)
            .map_err(|e| AuthError::Internal(format!("refresh token signing failed: {e}")))
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.access_dec, &Validation::default())
            .map(|data| data.claims)
            .map_err(classify_decode_error)
    }

    /// Verify a refresh token's signature and expiry.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        decode::<RefreshClaims>(token, &self.refresh_dec, &Validation::default())
            .map(|data| data.claims)
            .map_err(classify_decode_error)
    }
}

/// Time-expired tokens and malformed/mis-signed tokens are distinct
/// failure kinds; everything non-expiry collapses to `InvalidToken`.
fn classify_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&TokenConfig::new(
            "access-secret-long-enough-for-hmac",
            "refresh-secret-long-enough-for-hmac",
        ))
    }

    #[test]
    fn access_round_trip_preserves_claims() {
        let codec = test_codec();
        let now = Utc::now();
        let token = codec
            .sign_access(42, "ada@example.com", "admin", now)
            .unwrap();

        let claims = codec.verify_access(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::minutes(15)).timestamp());
    }

    #[test]
    fn refresh_round_trip_preserves_rotation_ids() {
        let codec = test_codec();
        let token = codec
            .sign_refresh(7, "ada@example.com", "customer", "jti-abc", "fam-xyz", Utc::now())
            .unwrap();

        let claims = codec.verify_refresh(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.jti, "jti-abc");
        assert_eq!(claims.family_id, "fam-xyz");
    }

    #[test]
    fn access_token_never_verifies_as_refresh() {
        let codec = test_codec();
        let access = codec
            .sign_access(1, "a@example.com", "customer", Utc::now())
            .unwrap();
        assert_matches!(codec.verify_refresh(&access), Err(AuthError::InvalidToken));
    }

    #[test]
    fn refresh_token_never_verifies_as_access() {
        let codec = test_codec();
        let refresh = codec
            .sign_refresh(1, "a@example.com", "customer", "j", "f", Utc::now())
            .unwrap();
        assert_matches!(codec.verify_access(&refresh), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_its_own_failure_kind() {
        let codec = test_codec();
        // Sign in the past so the 15m expiry is well beyond the default
        // 60-second validation leeway.
        let past = Utc::now() - Duration::minutes(30);
        let token = codec
            .sign_access(1, "a@example.com", "customer", past)
            .unwrap();
        assert_matches!(codec.verify_access(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = test_codec();
        assert_matches!(
            codec.verify_refresh("not.a.jwt"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let codec = test_codec();
        let other = TokenCodec::new(&TokenConfig::new("other-access", "other-refresh"));
        let token = codec
            .sign_access(1, "a@example.com", "customer", Utc::now())
            .unwrap();
        assert_matches!(other.verify_access(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn generated_ids_are_unique_hex() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_hash_is_stable_sha256_hex() {
        let h1 = hash_token("some-signed-token");
        let h2 = hash_token("some-signed-token");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, hash_token("another-token"));
    }
}
