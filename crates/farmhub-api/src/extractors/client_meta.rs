//! `ClientMeta` extractor — IP address and User-Agent for attempt keying
//! and audit records.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use farmhub_auth::session::ClientInfo;
use farmhub_core::error::AppError;

/// Client metadata pulled from request headers.
///
/// The platform fronts this service with a proxy, so the client IP comes
/// from `x-forwarded-for` (first hop).
#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

impl ClientMeta {
    /// Returns the inner `ClientInfo`.
    pub fn info(&self) -> &ClientInfo {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(ClientMeta(ClientInfo::new(ip_address, user_agent)))
    }
}
