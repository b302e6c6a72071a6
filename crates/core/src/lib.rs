//! Domain types and boundaries for the session lifecycle core.
//!
//! - [`session`] -- the Session record, its derived state machine, and DTOs.
//! - [`store`] -- async persistence boundaries ([`store::SessionStore`],
//!   [`store::IdentityStore`]) implemented by `tessera-db` and by the
//!   in-memory stores in `tessera-auth`.
//! - [`error`] -- the failure taxonomy shared by every layer.
//! - [`clock`] -- injectable time source so expiry logic is testable.
//! - [`ttl`] -- typed parsing of `"30d"`-style lifetime specs.

pub mod clock;
pub mod error;
pub mod identity;
pub mod session;
pub mod store;
pub mod ttl;
pub mod types;
