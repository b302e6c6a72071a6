//! Row structs and their mappings into the domain types.
//!
//! Each submodule contains a `FromRow` struct matching the table layout and
//! a `From` impl into the corresponding `tessera-core` type.

pub mod identity;
pub mod session;
