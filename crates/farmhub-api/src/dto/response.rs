//! Response DTOs.
//!
//! Session bodies use camelCase field names for the SPA client. The
//! refresh token appears in the body for non-cookie clients, but the
//! httpOnly cookie remains authoritative for browser flows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use farmhub_auth::session::SessionBundle;
use farmhub_entity::user::User;

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

/// Session bundle returned by signup, login, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Public user fields.
    pub user: UserResponse,
    /// Signed JWT access token.
    pub access_token: String,
    /// Opaque refresh token (the cookie is authoritative for browsers).
    pub refresh_token: String,
    /// CSRF token to echo in `X-CSRF-Token` on mutating requests.
    pub csrf_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl From<&SessionBundle> for SessionResponse {
    fn from(bundle: &SessionBundle) -> Self {
        Self {
            user: UserResponse::from(&bundle.user),
            access_token: bundle.access_token.clone(),
            refresh_token: bundle.refresh_token.clone(),
            csrf_token: bundle.csrf_token.clone(),
            expires_in: bundle.expires_in,
        }
    }
}

/// Response for `GET /api/auth/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Always true on success.
    pub valid: bool,
    /// The authenticated user.
    pub user: UserResponse,
}

/// Response for `POST /api/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Always true on success.
    pub success: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database connectivity.
    pub database: String,
}
