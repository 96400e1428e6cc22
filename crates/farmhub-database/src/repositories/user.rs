//! User repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use farmhub_core::error::{AppError, ErrorKind};
use farmhub_core::result::AppResult;
use farmhub_entity::user::{CreateUser, User};

/// Repository for user account rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive, trimmed).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER(TRIM($1))")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Create a new user. Fails with `DuplicateUser` when the email exists.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::duplicate_user("An account with this email already exists")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }
}
