use crate::types::DbId;

/// Authentication and session-lifecycle failures.
///
/// Every operation of the session manager resolves to one of these; nothing
/// else escapes the protocol boundary. Callers map each variant to a
/// user-visible status without echoing internal detail -- in particular,
/// [`AuthError::InvalidCredentials`] never distinguishes an unknown email
/// from a wrong password.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Login with an unknown identity or a non-matching password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed or mis-signed token.
    #[error("Invalid token")]
    InvalidToken,

    /// Syntactically valid token past its expiry.
    #[error("Expired token")]
    ExpiredToken,

    /// The refresh token's session is already rotated or revoked.
    ///
    /// Raising this may have triggered a family-wide cascade revocation
    /// (reuse signal handling).
    #[error("Session revoked")]
    RevokedSession,

    /// An identity or session referenced by id does not exist.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Persistence failure. Kept distinct from authentication failures so
    /// callers can surface "service unavailable" instead of a misleading
    /// credential error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected crypto/signing failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures at the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store is unreachable or rejected the statement.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    /// A rotation lost the race: the presented session was already revoked
    /// or missing when the conditional revoke-old update ran.
    #[error("Rotation conflict for jti {0}")]
    RotationConflict(String),
}
