//! Security event repository implementation.

use sqlx::SqlitePool;
use uuid::Uuid;

use farmhub_core::error::{AppError, ErrorKind};
use farmhub_core::result::AppResult;
use farmhub_entity::audit::{CreateSecurityEvent, SecurityEvent, SecurityEventType};

/// Repository for the append-only security audit log.
///
/// The application only ever inserts and reads; retention is an ops
/// concern outside this codebase.
#[derive(Debug, Clone)]
pub struct SecurityEventRepository {
    pool: SqlitePool,
}

impl SecurityEventRepository {
    /// Create a new security event repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a security event.
    pub async fn create(&self, data: &CreateSecurityEvent) -> AppResult<SecurityEvent> {
        sqlx::query_as::<_, SecurityEvent>(
            "INSERT INTO security_events \
             (id, event_type, user_id, ip_address, user_agent, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.event_type)
        .bind(data.user_id)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.metadata)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create security event", e)
        })
    }

    /// List the most recent events for a user, newest first.
    pub async fn find_by_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<SecurityEvent>> {
        sqlx::query_as::<_, SecurityEvent>(
            "SELECT * FROM security_events WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list security events", e)
        })
    }

    /// Count events of one type. Used for forensic queries and tests.
    pub async fn count_by_type(&self, event_type: SecurityEventType) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM security_events WHERE event_type = $1")
            .bind(event_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count security events", e)
            })
    }
}
