//! Token revocation ledger over the database repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use farmhub_core::error::AppError;
use farmhub_database::repositories::revoked_token::RevokedTokenRepository;
use farmhub_entity::token::TokenKind;

/// Append-only ledger of revoked token identifiers.
///
/// The session orchestrator consults it on every protected request in
/// addition to the codec's signature/expiry checks. Entries outlive their
/// usefulness once the token's own expiry passes and are purged lazily.
#[derive(Debug, Clone)]
pub struct RevocationLedger {
    /// Ledger persistence.
    repo: Arc<RevokedTokenRepository>,
}

impl RevocationLedger {
    /// Creates a new revocation ledger.
    pub fn new(repo: Arc<RevokedTokenRepository>) -> Self {
        Self { repo }
    }

    /// Records a revocation. Idempotent.
    pub async fn revoke(
        &self,
        jti: Uuid,
        token_type: TokenKind,
        user_id: Uuid,
        natural_expiry: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.repo
            .insert(jti, token_type, user_id, natural_expiry)
            .await
    }

    /// Checks whether a jti has been revoked.
    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        self.repo.is_revoked(jti).await
    }

    /// Drops entries whose token has naturally expired. Best-effort
    /// maintenance; an expired token needs no revocation record.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.repo.purge_expired(Utc::now()).await
    }
}
