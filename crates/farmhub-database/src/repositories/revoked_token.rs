//! Revocation ledger repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use farmhub_core::error::{AppError, ErrorKind};
use farmhub_core::result::AppResult;
use farmhub_entity::token::TokenKind;

/// Repository for the append-only revoked token ledger.
#[derive(Debug, Clone)]
pub struct RevokedTokenRepository {
    pool: SqlitePool,
}

impl RevokedTokenRepository {
    /// Create a new revoked token repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a revocation. Idempotent: inserting the same jti twice is a
    /// no-op.
    pub async fn insert(
        &self,
        jti: Uuid,
        token_type: TokenKind,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, token_type, user_id, revoked_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(token_type)
        .bind(user_id)
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record revocation", e))?;

        Ok(())
    }

    /// Check whether a jti appears in the ledger.
    pub async fn is_revoked(&self, jti: Uuid) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check revocation", e)
                })?;

        Ok(exists)
    }

    /// Batch-delete entries whose token has naturally expired. An expired
    /// token needs no revocation record, so this bounds ledger growth.
    pub async fn purge_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge revocation ledger", e)
            })?;

        Ok(result.rows_affected())
    }
}
