//! Authentication and session configuration.

use serde::{Deserialize, Serialize};

/// Authentication, token, and lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Loaded once at startup;
    /// rotating it invalidates all outstanding access tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Failed login attempts within the window before lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i64,
    /// Sliding window for counting failed attempts, in minutes.
    #[serde(default = "default_lockout_window")]
    pub lockout_window_minutes: u64,
    /// Lockout duration once the threshold is crossed, in minutes.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
            max_failed_attempts: default_max_failed(),
            lockout_window_minutes: default_lockout_window(),
            lockout_duration_minutes: default_lockout_duration(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    3600
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_password_min() -> usize {
    8
}

fn default_max_failed() -> i64 {
    5
}

fn default_lockout_window() -> u64 {
    15
}

fn default_lockout_duration() -> u64 {
    15
}
