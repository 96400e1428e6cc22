//! JWT access token creation with configurable signing and TTL.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use farmhub_core::config::AuthConfig;
use farmhub_core::error::AppError;

use super::claims::Claims;

/// Creates signed JWT access tokens.
///
/// The signing key is process-wide configuration loaded once at startup;
/// rotating it invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in seconds.
    access_ttl_seconds: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .finish()
    }
}

/// A freshly minted access token together with its decoded claims.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// The signed compact token.
    pub token: String,
    /// The claims embedded in it.
    pub claims: Claims,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_seconds: config.access_ttl_seconds as i64,
        }
    }

    /// Mints an access token for the given user with a fresh random jti.
    pub fn mint_access_token(&self, user_id: Uuid, email: &str) -> Result<MintedToken, AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(self.access_ttl_seconds);

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(MintedToken { token, claims })
    }

    /// The configured access token lifetime in seconds.
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds as u64
    }
}
