//! Security event type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Security-relevant events recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    /// A new account was created.
    UserRegistered,
    /// Credentials verified and a session was issued.
    LoginSuccess,
    /// Credential verification failed.
    LoginFailed,
    /// An (email, IP) pair crossed the failed-attempt threshold.
    LockoutTriggered,
    /// A refresh token was rotated.
    TokenRefreshed,
    /// An already-rotated refresh token was replayed; the chain was revoked.
    TokenReuseDetected,
    /// A session was ended by the user.
    Logout,
}

impl SecurityEventType {
    /// Return the event type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::LoginSuccess => "login_success",
            Self::LoginFailed => "login_failed",
            Self::LockoutTriggered => "lockout_triggered",
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenReuseDetected => "token_reuse_detected",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SecurityEventType {
    type Err = farmhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_registered" => Ok(Self::UserRegistered),
            "login_success" => Ok(Self::LoginSuccess),
            "login_failed" => Ok(Self::LoginFailed),
            "lockout_triggered" => Ok(Self::LockoutTriggered),
            "token_refreshed" => Ok(Self::TokenRefreshed),
            "token_reuse_detected" => Ok(Self::TokenReuseDetected),
            "logout" => Ok(Self::Logout),
            _ => Err(farmhub_core::AppError::validation(format!(
                "Invalid security event type: '{s}'"
            ))),
        }
    }
}
