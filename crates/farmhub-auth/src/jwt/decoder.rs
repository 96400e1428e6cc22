//! JWT access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use farmhub_core::config::AuthConfig;
use farmhub_core::error::AppError;

use super::claims::Claims;

/// Validates JWT access tokens.
///
/// Verification is a pure function over signature and expiry: no I/O, no
/// revocation lookups. Every failure maps to `Unauthorized` so callers
/// cannot distinguish a bad signature from an expired token.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // Expiry is exclusive; no clock-skew allowance.
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks signature validity and expiry. A token presented at exactly
    /// its `exp` second is rejected.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        let claims = token_data.claims;

        // jsonwebtoken treats exp == now as still valid; the contract here
        // is exclusive expiry.
        if claims.is_expired() {
            return Err(AppError::unauthorized("Token has expired"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use farmhub_core::error::ErrorKind;
    use uuid::Uuid;

    fn config(ttl: u64) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_ttl_seconds: ttl,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn decode_roundtrip_preserves_claims() {
        let cfg = config(3600);
        let encoder = JwtEncoder::new(&cfg);
        let decoder = JwtDecoder::new(&cfg);

        let user_id = Uuid::new_v4();
        let minted = encoder.mint_access_token(user_id, "rancher@plainsview.farm").unwrap();
        let claims = decoder.decode_access_token(&minted.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "rancher@plainsview.farm");
        assert_eq!(claims.jti, minted.claims.jti);
    }

    #[test]
    fn rejects_token_at_exact_expiry() {
        let cfg = config(0);
        let encoder = JwtEncoder::new(&cfg);
        let decoder = JwtDecoder::new(&cfg);

        let minted = encoder
            .mint_access_token(Uuid::new_v4(), "rancher@plainsview.farm")
            .unwrap();
        let err = decoder.decode_access_token(&minted.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn rejects_token_signed_with_other_key() {
        let encoder = JwtEncoder::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            ..config(3600)
        });
        let decoder = JwtDecoder::new(&config(3600));

        let minted = encoder
            .mint_access_token(Uuid::new_v4(), "rancher@plainsview.farm")
            .unwrap();
        let err = decoder.decode_access_token(&minted.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn rejects_garbage() {
        let decoder = JwtDecoder::new(&config(3600));
        assert!(decoder.decode_access_token("not.a.token").is_err());
    }

    #[test]
    fn fresh_jti_per_mint() {
        let encoder = JwtEncoder::new(&config(3600));
        let a = encoder
            .mint_access_token(Uuid::new_v4(), "a@x.com")
            .unwrap();
        let b = encoder
            .mint_access_token(Uuid::new_v4(), "a@x.com")
            .unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }
}
