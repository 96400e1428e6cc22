//! Session lifecycle orchestrator — signup, login, validate, refresh,
//! and logout flows.
//!
//! Each flow sequences its stores as ordered awaits: lockout check first,
//! then credential work, then token minting, with the audit write
//! completing before the response. Every lower-layer failure is mapped to
//! the client-facing error taxonomy here; token theft surfaces to the
//! caller as a plain `Unauthorized` while the full details land in the
//! audit log.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use farmhub_core::error::AppError;
use farmhub_database::repositories::user::UserRepository;
use farmhub_entity::audit::SecurityEventType;
use farmhub_entity::token::TokenKind;
use farmhub_entity::user::{CreateUser, User};
use uuid::Uuid;

use crate::csrf::CsrfIssuer;
use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::lockout::LoginAttemptLimiter;
use crate::password::{PasswordHasher, PasswordValidator};

use super::audit::{ClientInfo, SecurityAudit};
use super::revocation::RevocationLedger;
use super::store::{RefreshTokenStore, RotateOutcome};

/// Everything a successful signup/login/refresh hands back: the tokens,
/// their lifetimes, and the authenticated user.
#[derive(Debug, Clone)]
pub struct SessionBundle {
    /// The authenticated user.
    pub user: User,
    /// Signed JWT access token.
    pub access_token: String,
    /// Opaque refresh token value (also set as the httpOnly cookie).
    pub refresh_token: String,
    /// CSRF token bound to the refresh token. Returned in the body only.
    pub csrf_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds (cookie Max-Age).
    pub refresh_max_age: u64,
}

/// Coordinates the credential store, token codec, refresh store,
/// revocation ledger, attempt limiter, and audit log into the five
/// session flows.
#[derive(Clone)]
pub struct SessionManager {
    /// User persistence.
    user_repo: Arc<UserRepository>,
    /// Access token minting.
    jwt_encoder: Arc<JwtEncoder>,
    /// Access token verification.
    jwt_decoder: Arc<JwtDecoder>,
    /// Password hashing.
    password_hasher: Arc<PasswordHasher>,
    /// Password policy.
    password_validator: Arc<PasswordValidator>,
    /// Refresh token persistence and rotation.
    refresh_store: Arc<RefreshTokenStore>,
    /// Revoked jti ledger.
    revocation: Arc<RevocationLedger>,
    /// Failed-login limiter.
    limiter: Arc<LoginAttemptLimiter>,
    /// Audit recorder.
    audit: Arc<SecurityAudit>,
    /// CSRF token issuer.
    csrf: CsrfIssuer,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<UserRepository>,
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        password_hasher: Arc<PasswordHasher>,
        password_validator: Arc<PasswordValidator>,
        refresh_store: Arc<RefreshTokenStore>,
        revocation: Arc<RevocationLedger>,
        limiter: Arc<LoginAttemptLimiter>,
        audit: Arc<SecurityAudit>,
    ) -> Self {
        Self {
            user_repo,
            jwt_encoder,
            jwt_decoder,
            password_hasher,
            password_validator,
            refresh_store,
            revocation,
            limiter,
            audit,
            csrf: CsrfIssuer::new(),
        }
    }

    /// Creates an account and immediately opens a session (auto-login).
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        client: &ClientInfo,
    ) -> Result<SessionBundle, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name must not be empty"));
        }

        self.password_validator.validate(password)?;

        let password_hash = self.password_hasher.hash(password)?;
        let user = self
            .user_repo
            .create(&CreateUser {
                email,
                password_hash,
                name: name.to_string(),
            })
            .await?;

        let bundle = self.open_session(&user).await?;

        self.audit
            .record(SecurityEventType::UserRegistered, Some(user.id), client, None)
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(bundle)
    }

    /// Verifies credentials and opens a session.
    ///
    /// The lockout check runs before any credential work so locked-out
    /// requests never touch the credential store. Unknown emails take the
    /// same failure path as wrong passwords.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<SessionBundle, AppError> {
        let email = normalize_email(email);
        let ip = client_ip(client);

        if self.limiter.is_locked(&email, &ip).await? {
            return Err(AppError::locked_out());
        }

        let user = self.user_repo.find_by_email(&email).await?;

        let Some(user) = user else {
            // Burn comparable hashing work for unknown emails so response
            // timing does not reveal whether the account exists.
            self.password_hasher.hash(password)?;
            self.note_failure(&email, &ip, None, client).await?;
            return Err(AppError::invalid_credentials());
        };

        if !self.password_hasher.verify(password, &user.password_hash)? {
            self.note_failure(&email, &ip, Some(user.id), client).await?;
            return Err(AppError::invalid_credentials());
        }

        self.limiter.record_success(&email, &ip).await?;

        let bundle = self.open_session(&user).await?;

        self.audit
            .record(SecurityEventType::LoginSuccess, Some(user.id), client, None)
            .await?;

        info!(user_id = %user.id, "Login successful");
        Ok(bundle)
    }

    /// Validates an access token: signature and expiry via the codec,
    /// then the revocation ledger. Both failures surface identically.
    pub async fn validate(&self, access_token: &str) -> Result<(Claims, User), AppError> {
        let claims = self.jwt_decoder.decode_access_token(access_token)?;

        if self.revocation.is_revoked(claims.jti).await? {
            return Err(AppError::unauthorized("Token has been revoked"));
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

        Ok((claims, user))
    }

    /// Rotates the refresh token and mints a fresh access + CSRF pair.
    ///
    /// CSRF is validated against the presented token's binding before the
    /// rotation is attempted. A replayed (already-rotated) value revokes
    /// the whole family and comes back as `Unauthorized`, forcing a full
    /// re-login; the caller is never told a theft was suspected.
    pub async fn refresh(
        &self,
        refresh_value: &str,
        csrf_header: &str,
        client: &ClientInfo,
    ) -> Result<SessionBundle, AppError> {
        let row = self
            .refresh_store
            .find_by_value(refresh_value)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown refresh token"))?;

        if !self.csrf.matches(csrf_header, &row.csrf_token) {
            return Err(AppError::forbidden("CSRF token mismatch"));
        }

        let new_csrf = self.csrf.issue();
        match self.refresh_store.rotate(refresh_value, &new_csrf).await? {
            RotateOutcome::ReuseDetected { old, revoked_count } => {
                self.audit
                    .record(
                        SecurityEventType::TokenReuseDetected,
                        Some(old.user_id),
                        client,
                        Some(json!({
                            "family_id": old.family_id,
                            "replayed_jti": old.id,
                            "revoked": revoked_count,
                        })),
                    )
                    .await?;

                Err(AppError::unauthorized("Refresh token is no longer valid"))
            }
            RotateOutcome::Rotated { token, old } => {
                let user = self
                    .user_repo
                    .find_by_id(old.user_id)
                    .await?
                    .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

                let minted = self.jwt_encoder.mint_access_token(user.id, &user.email)?;

                self.audit
                    .record(
                        SecurityEventType::TokenRefreshed,
                        Some(user.id),
                        client,
                        Some(json!({
                            "rotated_jti": old.id,
                            "new_jti": token.record.id,
                        })),
                    )
                    .await?;

                Ok(SessionBundle {
                    user,
                    access_token: minted.token,
                    refresh_token: token.value,
                    csrf_token: new_csrf,
                    expires_in: self.jwt_encoder.access_ttl_seconds(),
                    refresh_max_age: self.refresh_store.ttl_seconds(),
                })
            }
        }
    }

    /// Ends the session: revokes the access token's jti and the bound
    /// refresh token.
    ///
    /// A second logout with the same access token fails `Unauthorized`
    /// at the ledger check — terminal, not a crash.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_value: Option<&str>,
        csrf_header: &str,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let claims = self.jwt_decoder.decode_access_token(access_token)?;

        if self.revocation.is_revoked(claims.jti).await? {
            return Err(AppError::unauthorized("Token has been revoked"));
        }

        let refresh_value = refresh_value
            .ok_or_else(|| AppError::forbidden("Missing session binding for CSRF validation"))?;

        let row = self
            .refresh_store
            .find_by_value(refresh_value)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown refresh token"))?;

        if row.user_id != claims.sub {
            return Err(AppError::unauthorized("Session mismatch"));
        }

        if !self.csrf.matches(csrf_header, &row.csrf_token) {
            return Err(AppError::forbidden("CSRF token mismatch"));
        }

        // Ledger writes must land before the response; a lost revocation
        // would leave a live token behind.
        self.revocation
            .revoke(claims.jti, TokenKind::Access, claims.sub, claims.expires_at())
            .await?;
        self.refresh_store.revoke_by_id(row.id).await?;
        self.revocation
            .revoke(row.id, TokenKind::Refresh, row.user_id, row.expires_at)
            .await?;

        self.audit
            .record(SecurityEventType::Logout, Some(claims.sub), client, None)
            .await?;

        info!(user_id = %claims.sub, "Logout completed");

        self.maintain().await;
        Ok(())
    }

    /// Revokes every refresh token a user holds. Used on detected
    /// compromise or account-level actions.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.refresh_store.revoke_all_for_user(user_id).await
    }

    /// Lazy garbage collection of naturally-expired rows. Best-effort:
    /// failures are logged, never surfaced.
    pub async fn maintain(&self) {
        if let Err(e) = self.revocation.purge_expired().await {
            warn!(error = %e, "Failed to purge revocation ledger");
        }
        if let Err(e) = self.refresh_store.purge_expired().await {
            warn!(error = %e, "Failed to purge expired refresh tokens");
        }
        if let Err(e) = self.limiter.purge_stale().await {
            warn!(error = %e, "Failed to purge stale login attempts");
        }
    }

    /// Mints the full token set for an authenticated user.
    async fn open_session(&self, user: &User) -> Result<SessionBundle, AppError> {
        let csrf_token = self.csrf.issue();
        let refresh = self.refresh_store.issue(user.id, &csrf_token).await?;
        let minted = self.jwt_encoder.mint_access_token(user.id, &user.email)?;

        Ok(SessionBundle {
            user: user.clone(),
            access_token: minted.token,
            refresh_token: refresh.value,
            csrf_token,
            expires_in: self.jwt_encoder.access_ttl_seconds(),
            refresh_max_age: self.refresh_store.ttl_seconds(),
        })
    }

    /// Records a failed attempt and the matching audit events. The
    /// limiter write completes before the error is returned — failing to
    /// record a lockout fails the request.
    async fn note_failure(
        &self,
        email: &str,
        ip: &str,
        user_id: Option<Uuid>,
        client: &ClientInfo,
    ) -> Result<(), AppError> {
        let outcome = self.limiter.record_failure(email, ip).await?;

        if outcome.just_locked {
            self.audit
                .record(
                    SecurityEventType::LockoutTriggered,
                    user_id,
                    client,
                    Some(json!({
                        "email": email,
                        "attempts": outcome.attempt_count,
                    })),
                )
                .await?;
        }

        self.audit
            .record(
                SecurityEventType::LoginFailed,
                user_id,
                client,
                Some(json!({ "email": email })),
            )
            .await?;

        Ok(())
    }
}

/// Lowercases and trims an email for lookup and storage.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The IP used for attempt keying when the platform reports none.
fn client_ip(client: &ClientInfo) -> String {
    client
        .ip_address
        .clone()
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Rancher@Plainsview.FARM "), "rancher@plainsview.farm");
    }
}
