//! Refresh token repository implementation.
//!
//! Rotation correctness depends on the conditional updates here: the
//! `AND revoked = 0` guard makes the first of two racing writers win and
//! the loser observe zero affected rows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use farmhub_core::error::{AppError, ErrorKind};
use farmhub_core::result::AppResult;
use farmhub_entity::token::{CreateRefreshToken, RefreshToken};

/// Repository for refresh token rows.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: SqlitePool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued refresh token.
    pub async fn create(&self, data: &CreateRefreshToken) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens \
             (id, user_id, family_id, token_hash, csrf_token, issued_at, expires_at, revoked, replaced_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, NULL) \
             RETURNING *",
        )
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.family_id)
        .bind(&data.token_hash)
        .bind(&data.csrf_token)
        .bind(Utc::now())
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create refresh token", e)
        })
    }

    /// Find a refresh token row by the digest of its opaque value.
    pub async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    /// Find a refresh token row by its jti.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token by id", e)
            })
    }

    /// Atomically mark a token rotated: revoked with `replaced_by` set.
    ///
    /// Returns the number of rows changed. Zero means another request got
    /// there first (or the token was never active) and the caller must
    /// treat the rotation as a replay.
    pub async fn mark_rotated(&self, old_id: Uuid, new_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = 1, replaced_by = $1 \
             WHERE id = $2 AND revoked = 0",
        )
        .bind(new_id)
        .bind(old_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark token rotated", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Revoke a single token by jti.
    pub async fn revoke_by_id(&self, id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE id = $1 AND revoked = 0")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
                })?;

        Ok(result.rows_affected())
    }

    /// Revoke every token in a lineage. Used on replay detection.
    pub async fn revoke_family(&self, family_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = 1 WHERE family_id = $1 AND revoked = 0",
        )
        .bind(family_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke token family", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Revoke every active token belonging to a user.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = $1 AND revoked = 0")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to revoke user tokens", e)
                })?;

        Ok(result.rows_affected())
    }

    /// Delete rows whose natural expiry has passed. Returns rows removed.
    pub async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;

        Ok(result.rows_affected())
    }
}
