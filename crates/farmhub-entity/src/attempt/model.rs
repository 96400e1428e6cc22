//! Login attempt entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Failed-login counter for one (email, IP) pair.
///
/// Keyed independently of the users table so that attempts against
/// unregistered emails are throttled identically to registered ones.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// The email that was attempted (may not correspond to any account).
    pub email: String,
    /// The client IP the attempts came from.
    pub ip_address: String,
    /// Consecutive failed attempts within the current window.
    pub attempt_count: i64,
    /// When the most recent attempt was recorded.
    pub last_attempt_at: DateTime<Utc>,
    /// If set, further attempts are rejected until this time.
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginAttempt {
    /// Check whether this (email, IP) pair is currently locked out.
    pub fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| until > Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attempt(locked_until: Option<DateTime<Utc>>) -> LoginAttempt {
        LoginAttempt {
            email: "a@x.com".to_string(),
            ip_address: "203.0.113.7".to_string(),
            attempt_count: 5,
            last_attempt_at: Utc::now(),
            locked_until,
        }
    }

    #[test]
    fn test_is_locked() {
        assert!(attempt(Some(Utc::now() + Duration::minutes(5))).is_locked());
        assert!(!attempt(Some(Utc::now() - Duration::minutes(5))).is_locked());
        assert!(!attempt(None).is_locked());
    }
}
