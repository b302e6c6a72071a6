//! Argon2id credential hashing and verification.
//!
//! Hashes use the PHC string format so algorithm parameters and salt travel
//! with the hash. Verification is the deliberately slow, timing-resistant
//! comparison; a non-match is a normal `Ok(false)` outcome, not an error --
//! the caller maps it to a generic authentication failure. Neither the raw
//! secret nor the hash is ever logged.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tessera_core::error::AuthError;

/// Hash a plaintext secret with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext secret against a stored PHC-formatted hash.
///
/// `Ok(false)` means the secret does not match; `Err` is reserved for
/// malformed hashes and other non-comparison failures.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Internal(format!("stored hash is malformed: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}
