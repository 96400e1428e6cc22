//! Integration tests for refresh token rotation, CSRF enforcement, and
//! replay (theft) detection.

mod common;

use http::StatusCode;

async fn refresh_with(
    app: &common::TestApp,
    cookie: &str,
    csrf: Option<&str>,
) -> common::TestResponse {
    let cookie_header = format!("refresh_token={cookie}");
    let mut headers: Vec<(&str, &str)> = vec![("cookie", &cookie_header)];
    if let Some(csrf) = csrf {
        headers.push(("x-csrf-token", csrf));
    }
    app.request("POST", "/api/auth/refresh", None, &headers)
        .await
}

#[tokio::test]
async fn test_refresh_rotates_every_credential() {
    let app = common::TestApp::new().await;
    let session = app.signup("rot@x.com", "Str0ngPass!", "Rot").await;

    let response = refresh_with(&app, &session.refresh_cookie, Some(&session.csrf_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let rotated = common::Session::from_response(&response);
    assert_ne!(rotated.access_token, session.access_token);
    assert_ne!(rotated.refresh_cookie, session.refresh_cookie);
    assert_ne!(rotated.csrf_token, session.csrf_token);

    // The rotated session is live.
    let validate = app
        .request(
            "GET",
            "/api/auth/validate",
            None,
            &[("authorization", &rotated.bearer())],
        )
        .await;
    assert_eq!(validate.status, StatusCode::OK);

    assert_eq!(app.count_events("token_refreshed").await, 1);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    let app = common::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            None,
            &[("x-csrf-token", "whatever")],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_missing_or_wrong_csrf_is_forbidden() {
    let app = common::TestApp::new().await;
    let session = app.signup("e@x.com", "Str0ngPass!", "E").await;

    let missing = refresh_with(&app, &session.refresh_cookie, None).await;
    assert_eq!(missing.status, StatusCode::FORBIDDEN);
    assert_eq!(missing.error_code(), Some("FORBIDDEN"));

    let wrong = refresh_with(&app, &session.refresh_cookie, Some("forged-token")).await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    // The CSRF failures did not consume the token.
    let ok = refresh_with(&app, &session.refresh_cookie, Some(&session.csrf_token)).await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[tokio::test]
async fn test_replayed_refresh_token_revokes_the_whole_chain() {
    let app = common::TestApp::new().await;
    let stolen = app.signup("c@x.com", "Str0ngPass!", "C").await;

    // Legitimate rotation.
    let response = refresh_with(&app, &stolen.refresh_cookie, Some(&stolen.csrf_token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let current = common::Session::from_response(&response);

    // The thief replays the old cookie (with the old CSRF token they
    // intercepted alongside it).
    let replay = refresh_with(&app, &stolen.refresh_cookie, Some(&stolen.csrf_token)).await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    // The client is told nothing about theft detection.
    assert_eq!(replay.error_code(), Some("UNAUTHORIZED"));
    let message = replay.body["error"]["message"].as_str().unwrap();
    assert!(!message.to_lowercase().contains("theft"));
    assert!(!message.to_lowercase().contains("stolen"));

    // Internally it is a security event.
    assert_eq!(app.count_events("token_reuse_detected").await, 1);

    // The latest legitimate token is dead too: full re-login required.
    let after = refresh_with(&app, &current.refresh_cookie, Some(&current.csrf_token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_concurrent_rotation_has_exactly_one_winner() {
    let app = common::TestApp::new().await;
    let session = app.signup("race@x.com", "Str0ngPass!", "Race").await;

    let (a, b) = tokio::join!(
        refresh_with(&app, &session.refresh_cookie, Some(&session.csrf_token)),
        refresh_with(&app, &session.refresh_cookie, Some(&session.csrf_token)),
    );

    let successes = [&a, &b]
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count();
    let rejected = [&a, &b]
        .iter()
        .filter(|r| r.status == StatusCode::UNAUTHORIZED)
        .count();

    assert_eq!(
        (successes, rejected),
        (1, 1),
        "two racing rotations of one value must yield exactly one success, got {:?} / {:?}",
        a.status,
        b.status
    );
}

#[tokio::test]
async fn test_refresh_does_not_extend_access_token_revocation() {
    let app = common::TestApp::new().await;
    let session = app.signup("ledger@x.com", "Str0ngPass!", "Ledger").await;

    // Log out, revoking the access token's jti.
    let logout = app
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
    assert_eq!(logout.status, StatusCode::OK);

    // The refresh token died with the session.
    let refresh = refresh_with(&app, &session.refresh_cookie, Some(&session.csrf_token)).await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}
