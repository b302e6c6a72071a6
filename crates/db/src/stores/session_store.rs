//! Postgres-backed session store.
//!
//! Every mutation is a conditional `UPDATE ... WHERE revoked_at IS NULL`
//! scoped by `jti`/`family_id`/`user_id`, never a full-row rewrite, and
//! rows are never deleted. Rotation wraps its revoke-old + insert-new pair
//! in a transaction so no reader observes a half-rotated chain.

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_core::error::StoreError;
use tessera_core::session::{NewSession, Session};
use tessera_core::store::SessionStore;
use tessera_core::types::DbId;

use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, jti, family_id, token_hash, replaced_by_jti, \
                       user_agent, ip, expires_at, revoked_at, created_at, updated_at";

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "session store query failed");
    StoreError::Unavailable(err.to_string())
}

fn insert_query() -> String {
    format!(
        "INSERT INTO sessions (user_id, jti, family_id, token_hash, user_agent, ip, expires_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {COLUMNS}"
    )
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, input: NewSession) -> Result<Session, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(&insert_query())
            .bind(input.user_id)
            .bind(&input.jti)
            .bind(&input.family_id)
            .bind(&input.token_hash)
            .bind(&input.user_agent)
            .bind(&input.ip)
            .bind(input.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.into())
    }

    async fn find_by_jti(&self, jti: &str) -> Result<Option<Session>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE jti = $1");
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Session::from))
    }

    async fn revoke(&self, jti: &str, replaced_by_jti: Option<&str>) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE sessions
             SET revoked_at = NOW(), replaced_by_jti = COALESCE($2, replaced_by_jti),
                 updated_at = NOW()
             WHERE jti = $1 AND revoked_at IS NULL",
        )
        .bind(jti)
        .bind(replaced_by_jti)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn revoke_family(&self, family_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW(), updated_at = NOW()
             WHERE family_id = $1 AND revoked_at IS NULL",
        )
        .bind(family_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn revoke_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW(), updated_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn rotate(
        &self,
        old_jti: &str,
        replacement: NewSession,
    ) -> Result<Session, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Conditional revoke-old: of two rotations racing on the same jti,
        // only one sees an unrevoked row here.
        let updated = sqlx::query(
            "UPDATE sessions
             SET revoked_at = NOW(), replaced_by_jti = $2, updated_at = NOW()
             WHERE jti = $1 AND revoked_at IS NULL",
        )
        .bind(old_jti)
        .bind(&replacement.jti)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(StoreError::RotationConflict(old_jti.to_string()));
        }

        let row = sqlx::query_as::<_, SessionRow>(&insert_query())
            .bind(replacement.user_id)
            .bind(&replacement.jti)
            .bind(&replacement.family_id)
            .bind(&replacement.token_hash)
            .bind(&replacement.user_agent)
            .bind(&replacement.ip)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(row.into())
    }
}
