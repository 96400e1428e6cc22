//! Integration tests for signup, login, validate, and logout flows.

mod common;

use http::StatusCode;

use farmhub_auth::jwt::JwtDecoder;

#[tokio::test]
async fn test_signup_success() {
    let app = common::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/signup",
            Some(serde_json::json!({
                "email": "a@x.com",
                "password": "Str0ngPass!",
                "name": "A",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(
        !response.body["accessToken"].as_str().unwrap().is_empty(),
        "accessToken must be non-empty"
    );
    assert!(!response.body["refreshToken"].as_str().unwrap().is_empty());
    assert!(!response.body["csrfToken"].as_str().unwrap().is_empty());
    assert_eq!(response.body["user"]["email"].as_str().unwrap(), "a@x.com");

    let cookie = response
        .headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refresh_token="))
        .expect("refresh cookie not set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age="));
}

#[tokio::test]
async fn test_signup_access_token_subject_matches_user() {
    let app = common::TestApp::new().await;
    let session = app.signup("barn@x.com", "Str0ngPass!", "Barn Owner").await;

    let decoder = JwtDecoder::new(&app.config.auth);
    let claims = decoder
        .decode_access_token(&session.access_token)
        .expect("freshly minted token must validate");

    assert_eq!(claims.sub.to_string(), session.user_id);
    assert_eq!(claims.email, "barn@x.com");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = common::TestApp::new().await;
    app.signup("dup@x.com", "Str0ngPass!", "First").await;

    let response = app
        .request(
            "POST",
            "/api/auth/signup",
            Some(serde_json::json!({
                "email": "dup@x.com",
                "password": "Another-Pass-9!",
                "name": "Second",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), Some("DUPLICATE_USER"));
}

#[tokio::test]
async fn test_signup_rejects_weak_password() {
    let app = common::TestApp::new().await;

    for password in ["", "short", "password"] {
        let response = app
            .request(
                "POST",
                "/api/auth/signup",
                Some(serde_json::json!({
                    "email": "weak@x.com",
                    "password": password,
                    "name": "Weak",
                })),
                &[],
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::BAD_REQUEST,
            "password {:?} should be rejected",
            password
        );
    }
}

#[tokio::test]
async fn test_signup_rejects_invalid_email() {
    let app = common::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/signup",
            Some(serde_json::json!({
                "email": "not-an-email",
                "password": "Str0ngPass!",
                "name": "A",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_login_success() {
    let app = common::TestApp::new().await;
    app.signup("farmer@x.com", "Str0ngPass!", "Farmer").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "farmer@x.com",
                "password": "Str0ngPass!",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("accessToken").is_some());
    assert!(response.body.get("refreshToken").is_some());
    assert_eq!(app.count_events("login_success").await, 1);
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = common::TestApp::new().await;
    app.signup("mixed@x.com", "Str0ngPass!", "Mixed").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "  MIXED@X.COM ",
                "password": "Str0ngPass!",
            })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_are_indistinguishable() {
    let app = common::TestApp::new().await;
    app.signup("real@x.com", "Str0ngPass!", "Real").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "real@x.com",
                "password": "WrongPass-1!",
            })),
            &[],
        )
        .await;

    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "email": "ghost@x.com",
                "password": "WrongPass-1!",
            })),
            &[],
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.error_code(), unknown_email.error_code());
    assert_eq!(
        wrong_password.body["error"]["message"],
        unknown_email.body["error"]["message"]
    );
}

#[tokio::test]
async fn test_validate_ok() {
    let app = common::TestApp::new().await;
    let session = app.signup("v@x.com", "Str0ngPass!", "V").await;

    let response = app
        .request(
            "GET",
            "/api/auth/validate",
            None,
            &[("authorization", &session.bearer())],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valid"], true);
    assert_eq!(response.body["user"]["email"].as_str().unwrap(), "v@x.com");
}

#[tokio::test]
async fn test_validate_unauthenticated() {
    let app = common::TestApp::new().await;

    let missing = app.request("GET", "/api/auth/validate", None, &[]).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(
            "GET",
            "/api/auth/validate",
            None,
            &[("authorization", "Bearer not.a.token")],
        )
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_then_validate() {
    let app = common::TestApp::new().await;
    let session = app.signup("out@x.com", "Str0ngPass!", "Out").await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            None,
            &[
                ("authorization", &session.bearer()),
                ("cookie", &session.cookie()),
                ("x-csrf-token", &session.csrf_token),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);

    // Cookie is cleared
    let cleared = response.refresh_cookie();
    assert_eq!(cleared.as_deref(), Some(""));

    // The access token is dead even though its signature and expiry are
    // still valid.
    let validate = app
        .request(
            "GET",
            "/api/auth/validate",
            None,
            &[("authorization", &session.bearer())],
        )
        .await;
    assert_eq!(validate.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.count_events("logout").await, 1);
}

#[tokio::test]
async fn test_logout_twice_is_unauthorized_not_a_crash() {
    let app = common::TestApp::new().await;
    let session = app.signup("twice@x.com", "Str0ngPass!", "Twice").await;

    let headers = [
        ("authorization", session.bearer()),
        ("cookie", session.cookie()),
        ("x-csrf-token", session.csrf_token.clone()),
    ];
    let header_refs: Vec<(&str, &str)> =
        headers.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let first = app
        .request("POST", "/api/auth/logout", None, &header_refs)
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", "/api/auth/logout", None, &header_refs)
        .await;
    assert_eq!(second.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_with_wrong_csrf_is_forbidden() {
    let app = common::TestApp::new().await;
    let session = app.signup("csrf@x.com", "Str0ngPass!", "Csrf").await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            None,
            &[
                ("authorization", &session.bearer()),
                ("cookie", &session.cookie()),
                ("x-csrf-token", "not-the-issued-token"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = common::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
    assert!(response.headers.get("content-security-policy").is_some());
    assert!(response.headers.get("strict-transport-security").is_some());
}
