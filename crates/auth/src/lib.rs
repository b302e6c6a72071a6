//! Session / refresh-token lifecycle manager.
//!
//! Issues short-lived access tokens and long-lived rotating refresh tokens,
//! detects refresh-token theft via reuse, and revokes token families.
//!
//! - [`password`] -- Argon2id credential hashing and verification.
//! - [`token`] -- signing and verification of the two token classes.
//! - [`manager`] -- login, refresh rotation, reuse handling, logout.
//! - [`memory`] -- in-memory store implementations for tests and
//!   single-process embedding.

pub mod manager;
pub mod memory;
pub mod password;
pub mod token;
