//! Refresh token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A server-side record of an opaque refresh token.
///
/// Tokens are single-use: rotation marks the old row revoked with
/// `replaced_by` pointing at its successor. All rotations of one login
/// session share a `family_id`, so a detected replay can revoke the whole
/// lineage at once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Token identifier (the refresh token's jti).
    pub id: Uuid,
    /// The user this token belongs to.
    pub user_id: Uuid,
    /// Lineage identifier shared by every rotation of one login session.
    pub family_id: Uuid,
    /// SHA-256 hex digest of the opaque token value. The plaintext value
    /// is never persisted.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// CSRF token currently bound to this session. Rotated together with
    /// the refresh token.
    #[serde(skip_serializing)]
    pub csrf_token: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// Whether the token has been revoked (by rotation, logout, or theft
    /// detection).
    pub revoked: bool,
    /// The jti of the token that replaced this one, if rotated.
    pub replaced_by: Option<Uuid>,
}

impl RefreshToken {
    /// Check whether the token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the token can still be used (not revoked, not expired).
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

/// Data required to persist a new refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefreshToken {
    /// Token identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Lineage identifier.
    pub family_id: Uuid,
    /// SHA-256 hex digest of the opaque value.
    pub token_hash: String,
    /// Bound CSRF token.
    pub csrf_token: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}
