//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use farmhub_auth::session::SessionManager;
use farmhub_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// SQLite connection pool (used directly only by the health probe).
    pub db_pool: SqlitePool,
    /// Session lifecycle orchestrator.
    pub session_manager: Arc<SessionManager>,
}
