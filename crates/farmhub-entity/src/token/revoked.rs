//! Revocation ledger entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Distinguishes access tokens from refresh tokens in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived access token for API requests.
    Access,
    /// Long-lived refresh token for obtaining new access tokens.
    Refresh,
}

impl TokenKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = farmhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(farmhub_core::AppError::validation(format!(
                "Invalid token kind: '{s}'. Expected one of: access, refresh"
            ))),
        }
    }
}

/// An entry in the token revocation ledger.
///
/// A jti listed here is rejected on every protected request even when its
/// signature and expiry would otherwise validate. Entries become garbage
/// once `expires_at` (the token's own natural expiry) has passed and may
/// then be purged.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevokedToken {
    /// The revoked token's jti.
    pub jti: Uuid,
    /// Whether this was an access or refresh token.
    pub token_type: TokenKind,
    /// The user the token belonged to.
    pub user_id: Uuid,
    /// When the revocation was recorded.
    pub revoked_at: DateTime<Utc>,
    /// The token's natural expiry; the entry is prunable after this.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kind_from_str() {
        assert_eq!("access".parse::<TokenKind>().unwrap(), TokenKind::Access);
        assert_eq!("REFRESH".parse::<TokenKind>().unwrap(), TokenKind::Refresh);
        assert!("bearer".parse::<TokenKind>().is_err());
    }
}
