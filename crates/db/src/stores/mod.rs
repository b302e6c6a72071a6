//! Store trait implementations over `PgPool`.

pub mod identity_store;
pub mod session_store;

pub use identity_store::PgIdentityStore;
pub use session_store::PgSessionStore;
