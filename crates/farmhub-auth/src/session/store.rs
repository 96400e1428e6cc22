//! Refresh token issuance and rotation over the database repository.
//!
//! Token values are opaque 256-bit random strings; only their SHA-256
//! digest is persisted. Rotation is single-use: the old row is revoked
//! with a conditional update before its successor is inserted, so two
//! requests replaying the same value can never both succeed.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use farmhub_core::config::AuthConfig;
use farmhub_core::error::AppError;
use farmhub_database::repositories::refresh_token::RefreshTokenRepository;
use farmhub_entity::token::{CreateRefreshToken, RefreshToken};

/// A freshly issued refresh token: the opaque value handed to the client
/// plus the persisted row.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// The opaque token value. Only ever sent to the client; the store
    /// keeps its digest.
    pub value: String,
    /// The persisted record.
    pub record: RefreshToken,
}

/// Result of a rotation attempt.
#[derive(Debug, Clone)]
pub enum RotateOutcome {
    /// The token was active and has been rotated.
    Rotated {
        /// The replacement token.
        token: IssuedRefreshToken,
        /// The now-revoked predecessor.
        old: RefreshToken,
    },
    /// The token was already revoked — a replay, treated as theft. The
    /// entire family has been revoked.
    ReuseDetected {
        /// The replayed row.
        old: RefreshToken,
        /// How many tokens the family revocation swept up.
        revoked_count: u64,
    },
}

/// Persists opaque refresh tokens with one-time-use rotation semantics.
#[derive(Debug, Clone)]
pub struct RefreshTokenStore {
    /// Refresh token persistence.
    repo: Arc<RefreshTokenRepository>,
    /// Refresh token lifetime.
    ttl: Duration,
}

impl RefreshTokenStore {
    /// Creates a new refresh token store.
    pub fn new(repo: Arc<RefreshTokenRepository>, config: &AuthConfig) -> Self {
        Self {
            repo,
            ttl: Duration::days(config.refresh_ttl_days as i64),
        }
    }

    /// The configured refresh token lifetime in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    /// Issues a brand-new token starting a fresh family (one per login).
    pub async fn issue(
        &self,
        user_id: Uuid,
        csrf_token: &str,
    ) -> Result<IssuedRefreshToken, AppError> {
        self.issue_in_family(user_id, Uuid::new_v4(), csrf_token)
            .await
    }

    /// Finds the persisted row for an opaque token value.
    pub async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, AppError> {
        self.repo.find_by_hash(&digest(value)).await
    }

    /// Rotates a token: atomically revokes the old row and issues its
    /// successor in the same family.
    ///
    /// Replaying an already-rotated value is the theft signal: the whole
    /// family is revoked and `ReuseDetected` is returned.
    pub async fn rotate(
        &self,
        old_value: &str,
        new_csrf_token: &str,
    ) -> Result<RotateOutcome, AppError> {
        let old = self
            .repo
            .find_by_hash(&digest(old_value))
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown refresh token"))?;

        if old.revoked {
            let revoked_count = self.repo.revoke_family(old.family_id).await?;
            warn!(
                user_id = %old.user_id,
                family_id = %old.family_id,
                revoked = revoked_count,
                "Refresh token replay detected; family revoked"
            );
            return Ok(RotateOutcome::ReuseDetected { old, revoked_count });
        }

        if old.is_expired() {
            return Err(AppError::unauthorized("Refresh token has expired"));
        }

        // Claim the rotation. Losing the race means another request holds
        // this same value — the replay path applies.
        let new_id = Uuid::new_v4();
        let claimed = self.repo.mark_rotated(old.id, new_id).await?;
        if claimed == 0 {
            let revoked_count = self.repo.revoke_family(old.family_id).await?;
            warn!(
                user_id = %old.user_id,
                family_id = %old.family_id,
                revoked = revoked_count,
                "Concurrent refresh token reuse detected; family revoked"
            );
            return Ok(RotateOutcome::ReuseDetected { old, revoked_count });
        }

        let token = self
            .create_with_id(new_id, old.user_id, old.family_id, new_csrf_token)
            .await?;

        Ok(RotateOutcome::Rotated { token, old })
    }

    /// Revokes a single token by jti. Returns true when a row changed.
    pub async fn revoke_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.repo.revoke_by_id(id).await? > 0)
    }

    /// Revokes every active token a user holds.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.repo.revoke_all_for_user(user_id).await
    }

    /// Drops rows past their natural expiry. Best-effort maintenance.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.repo.delete_expired(Utc::now()).await
    }

    async fn issue_in_family(
        &self,
        user_id: Uuid,
        family_id: Uuid,
        csrf_token: &str,
    ) -> Result<IssuedRefreshToken, AppError> {
        self.create_with_id(Uuid::new_v4(), user_id, family_id, csrf_token)
            .await
    }

    async fn create_with_id(
        &self,
        id: Uuid,
        user_id: Uuid,
        family_id: Uuid,
        csrf_token: &str,
    ) -> Result<IssuedRefreshToken, AppError> {
        let value = random_value();
        let record = self
            .repo
            .create(&CreateRefreshToken {
                id,
                user_id,
                family_id,
                token_hash: digest(&value),
                csrf_token: csrf_token.to_string(),
                expires_at: Utc::now() + self.ttl,
            })
            .await?;

        Ok(IssuedRefreshToken { value, record })
    }
}

/// Generates an opaque 256-bit token value.
fn random_value() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 digest of a token value, base64url encoded for storage.
fn digest(value: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(value.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_value_opaque() {
        let v = random_value();
        assert_eq!(digest(&v), digest(&v));
        assert_ne!(digest(&v), v);
        assert_eq!(v.len(), 43);
    }
}
