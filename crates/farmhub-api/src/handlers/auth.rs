//! Auth handlers — signup, login, validate, refresh, logout.
//!
//! The refresh token travels only in an httpOnly cookie; the CSRF token
//! travels only in the JSON body and must come back in the
//! `X-CSRF-Token` header on refresh and logout.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::AppendHeaders;
use axum_extra::extract::CookieJar;
use validator::Validate;

use farmhub_core::error::AppError;

use crate::dto::request::{LoginRequest, SignupRequest};
use crate::dto::response::{LogoutResponse, SessionResponse, ValidateResponse};
use crate::extractors::{AuthUser, ClientMeta, bearer_token};
use crate::state::AppState;

/// Name of the refresh token cookie.
const REFRESH_COOKIE: &str = "refresh_token";
/// Header carrying the CSRF double-submit token.
const CSRF_HEADER: &str = "x-csrf-token";

type CookieHeader = AppendHeaders<[(header::HeaderName, String); 1]>;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, CookieHeader, Json<SessionResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let bundle = state
        .session_manager
        .signup(&req.email, &req.password, &req.name, client.info())
        .await?;

    Ok((
        StatusCode::CREATED,
        set_refresh_cookie(&bundle.refresh_token, bundle.refresh_max_age),
        Json(SessionResponse::from(&bundle)),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientMeta,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieHeader, Json<SessionResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let bundle = state
        .session_manager
        .login(&req.email, &req.password, client.info())
        .await?;

    Ok((
        set_refresh_cookie(&bundle.refresh_token, bundle.refresh_max_age),
        Json(SessionResponse::from(&bundle)),
    ))
}

/// GET /api/auth/validate
pub async fn validate(auth: AuthUser) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: true,
        user: (&auth.user).into(),
    })
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    client: ClientMeta,
) -> Result<(CookieHeader, Json<SessionResponse>), AppError> {
    let refresh_value = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::unauthorized("Missing refresh token cookie"))?;

    let csrf = csrf_header(&headers)?;

    let bundle = state
        .session_manager
        .refresh(&refresh_value, csrf, client.info())
        .await?;

    Ok((
        set_refresh_cookie(&bundle.refresh_token, bundle.refresh_max_age),
        Json(SessionResponse::from(&bundle)),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    client: ClientMeta,
) -> Result<(CookieHeader, Json<LogoutResponse>), AppError> {
    let access_token = bearer_token(&headers)?.to_string();
    let refresh_value = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let csrf = csrf_header(&headers)?;

    state
        .session_manager
        .logout(&access_token, refresh_value.as_deref(), csrf, client.info())
        .await?;

    Ok((
        clear_refresh_cookie(),
        Json(LogoutResponse { success: true }),
    ))
}

/// Reads the CSRF double-submit header. Absence is a `Forbidden`, same as
/// a mismatch.
fn csrf_header(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::forbidden("Missing CSRF token header"))
}

/// Builds the `Set-Cookie` header installing the refresh token.
fn set_refresh_cookie(value: &str, max_age: u64) -> CookieHeader {
    AppendHeaders([(
        header::SET_COOKIE,
        format!(
            "{REFRESH_COOKIE}={value}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={max_age}"
        ),
    )])
}

/// Builds the `Set-Cookie` header clearing the refresh token.
fn clear_refresh_cookie() -> CookieHeader {
    AppendHeaders([(
        header::SET_COOKIE,
        format!("{REFRESH_COOKIE}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0"),
    )])
}
