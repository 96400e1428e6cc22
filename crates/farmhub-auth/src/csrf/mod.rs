//! CSRF double-submit token issuer.
//!
//! The token travels to the client in the JSON response body — not a
//! cookie — and must be echoed back in the `X-CSRF-Token` header on
//! state-changing requests. Because cross-site requests can send cookies
//! but cannot read response bodies, this defeats CSRF even though the
//! refresh token itself lives in an httpOnly cookie. Each token is bound
//! to one refresh-token row and rotates with it.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Number of random bytes per token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Mints and validates per-session CSRF tokens.
#[derive(Debug, Clone, Default)]
pub struct CsrfIssuer;

impl CsrfIssuer {
    /// Creates a new CSRF issuer.
    pub fn new() -> Self {
        Self
    }

    /// Issues a fresh random token.
    pub fn issue(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Compares a presented token against the one bound to the session.
    ///
    /// Comparison inspects every byte so timing does not reveal the
    /// position of the first mismatch.
    pub fn matches(&self, presented: &str, issued: &str) -> bool {
        if presented.len() != issued.len() {
            return false;
        }
        presented
            .bytes()
            .zip(issued.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        let issuer = CsrfIssuer::new();
        assert_ne!(issuer.issue(), issuer.issue());
    }

    #[test]
    fn token_carries_at_least_128_bits() {
        // 32 bytes base64url without padding is 43 characters.
        assert_eq!(CsrfIssuer::new().issue().len(), 43);
    }

    #[test]
    fn matches_exact_only() {
        let issuer = CsrfIssuer::new();
        let token = issuer.issue();
        assert!(issuer.matches(&token, &token));
        assert!(!issuer.matches(&token[..42], &token));
        assert!(!issuer.matches(&issuer.issue(), &token));
    }
}
