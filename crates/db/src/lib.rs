//! Postgres persistence for the session lifecycle core.
//!
//! Implements the `tessera-core` store traits over sqlx. Row structs live
//! in [`models`] and convert into the domain types, so storage technology
//! never leaks above the trait boundary.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod stores;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}
