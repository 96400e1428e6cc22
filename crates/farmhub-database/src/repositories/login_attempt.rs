//! Login attempt repository implementation.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use farmhub_core::error::{AppError, ErrorKind};
use farmhub_core::result::AppResult;
use farmhub_entity::attempt::LoginAttempt;

/// Repository for per-(email, IP) failed login counters.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: SqlitePool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the attempt row for an (email, IP) pair.
    pub async fn find(&self, email: &str, ip_address: &str) -> AppResult<Option<LoginAttempt>> {
        sqlx::query_as::<_, LoginAttempt>(
            "SELECT * FROM login_attempts WHERE email = $1 AND ip_address = $2",
        )
        .bind(email)
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find login attempt", e))
    }

    /// Record one failed attempt and return the updated row.
    ///
    /// The counter restarts at 1 when the previous attempt fell outside
    /// the sliding window (`window_start`); otherwise it increments. The
    /// upsert is a single statement so concurrent failures never lose an
    /// increment.
    pub async fn record_failure(
        &self,
        email: &str,
        ip_address: &str,
        window_start: DateTime<Utc>,
    ) -> AppResult<LoginAttempt> {
        sqlx::query_as::<_, LoginAttempt>(
            "INSERT INTO login_attempts (email, ip_address, attempt_count, last_attempt_at, locked_until) \
             VALUES ($1, $2, 1, $3, NULL) \
             ON CONFLICT (email, ip_address) DO UPDATE SET \
                 attempt_count = CASE \
                     WHEN login_attempts.last_attempt_at < $4 THEN 1 \
                     ELSE login_attempts.attempt_count + 1 \
                 END, \
                 last_attempt_at = $3 \
             RETURNING *",
        )
        .bind(email)
        .bind(ip_address)
        .bind(Utc::now())
        .bind(window_start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record login failure", e)
        })
    }

    /// Set the lockout deadline for an (email, IP) pair.
    pub async fn set_locked(
        &self,
        email: &str,
        ip_address: &str,
        until: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE login_attempts SET locked_until = $3 WHERE email = $1 AND ip_address = $2",
        )
        .bind(email)
        .bind(ip_address)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set lockout", e))?;

        Ok(())
    }

    /// Clear the counter on successful login.
    pub async fn reset(&self, email: &str, ip_address: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM login_attempts WHERE email = $1 AND ip_address = $2")
            .bind(email)
            .bind(ip_address)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to reset login attempts", e)
            })?;

        Ok(())
    }

    /// Delete stale rows: outside the window and not currently locked.
    pub async fn purge_stale(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM login_attempts \
             WHERE last_attempt_at < $1 AND (locked_until IS NULL OR locked_until < $2)",
        )
        .bind(before)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge login attempts", e)
        })?;

        Ok(result.rows_affected())
    }
}
