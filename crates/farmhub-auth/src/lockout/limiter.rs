//! Failed-login tracking and temporary lockout.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;

use farmhub_core::config::AuthConfig;
use farmhub_core::error::AppError;
use farmhub_database::repositories::login_attempt::LoginAttemptRepository;

/// Result of recording a failed login attempt.
#[derive(Debug, Clone, Copy)]
pub struct FailureOutcome {
    /// Failed attempts counted in the current window, including this one.
    pub attempt_count: i64,
    /// True when this failure crossed the threshold and triggered the
    /// lockout.
    pub just_locked: bool,
}

/// Tracks failed login attempts per (email, IP) pair and enforces
/// temporary lockout.
///
/// The pair keying throttles a single attacker without letting one IP
/// deny service to a known victim email. Lockout applies regardless of
/// credential correctness and before any credential work, so locked-out
/// requests never reach the credential store.
#[derive(Debug, Clone)]
pub struct LoginAttemptLimiter {
    /// Attempt persistence.
    repo: Arc<LoginAttemptRepository>,
    /// Attempts within the window before lockout.
    max_failed_attempts: i64,
    /// Sliding window for counting failures.
    window: Duration,
    /// How long a lockout lasts.
    lockout_duration: Duration,
}

impl LoginAttemptLimiter {
    /// Creates a new limiter from auth configuration.
    pub fn new(repo: Arc<LoginAttemptRepository>, config: &AuthConfig) -> Self {
        Self {
            repo,
            max_failed_attempts: config.max_failed_attempts,
            window: Duration::minutes(config.lockout_window_minutes as i64),
            lockout_duration: Duration::minutes(config.lockout_duration_minutes as i64),
        }
    }

    /// Checks whether the (email, IP) pair is currently locked out.
    pub async fn is_locked(&self, email: &str, ip_address: &str) -> Result<bool, AppError> {
        let attempt = self.repo.find(email, ip_address).await?;
        Ok(attempt.is_some_and(|a| a.is_locked()))
    }

    /// Records one failed attempt, locking the pair when the threshold is
    /// crossed within the window.
    pub async fn record_failure(
        &self,
        email: &str,
        ip_address: &str,
    ) -> Result<FailureOutcome, AppError> {
        let window_start = Utc::now() - self.window;
        let attempt = self
            .repo
            .record_failure(email, ip_address, window_start)
            .await?;

        let just_locked = attempt.attempt_count >= self.max_failed_attempts && !attempt.is_locked();

        if just_locked {
            let until = Utc::now() + self.lockout_duration;
            self.repo.set_locked(email, ip_address, until).await?;
            warn!(
                email = %email,
                ip = %ip_address,
                attempts = attempt.attempt_count,
                locked_until = %until,
                "Login lockout triggered"
            );
        }

        Ok(FailureOutcome {
            attempt_count: attempt.attempt_count,
            just_locked,
        })
    }

    /// Clears the counter after a successful login.
    pub async fn record_success(&self, email: &str, ip_address: &str) -> Result<(), AppError> {
        self.repo.reset(email, ip_address).await
    }

    /// Removes stale rows outside the window. Best-effort maintenance.
    pub async fn purge_stale(&self) -> Result<u64, AppError> {
        let before = Utc::now() - self.window;
        self.repo.purge_stale(before).await
    }
}
