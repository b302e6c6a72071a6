//! Postgres-backed identity reads.
//!
//! The `users` table is owned by the identity collaborator; this store only
//! reads the fields needed for credential verification and claim building.

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::error::StoreError;
use tessera_core::identity::Identity;
use tessera_core::store::IdentityStore;
use tessera_core::types::DbId;

use crate::models::identity::IdentityRow;

const COLUMNS: &str = "id, name, email, role, password_hash, created_at, updated_at";

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "identity store query failed");
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Identity::from))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Identity>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Identity::from))
    }
}
