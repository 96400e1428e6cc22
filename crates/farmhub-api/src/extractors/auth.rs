//! `AuthUser` extractor — pulls the JWT from the Authorization header,
//! validates it (signature, expiry, revocation ledger), and injects the
//! authenticated user.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use farmhub_auth::jwt::Claims;
use farmhub_core::error::AppError;
use farmhub_entity::user::User;

use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Decoded access token claims.
    pub claims: Claims,
    /// The authenticated user.
    pub user: User,
}

/// Pulls the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let (claims, user) = state.session_manager.validate(token).await?;
        Ok(AuthUser { claims, user })
    }
}
