//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use farmhub_core::config::{AppConfig, AuthConfig, DatabaseConfig};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: SqlitePool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application backed by a throwaway SQLite file
    pub async fn new() -> Self {
        let db_path = std::env::temp_dir().join(format!("farmhub-test-{}.db", Uuid::new_v4()));
        let config = AppConfig {
            server: Default::default(),
            database: DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", db_path.display()),
                max_connections: 5,
                ..Default::default()
            },
            auth: AuthConfig {
                jwt_secret: "integration-test-secret".to_string(),
                ..Default::default()
            },
            logging: Default::default(),
        };

        let db_pool = farmhub_database::connection::create_pool(&config.database)
            .await
            .expect("Failed to connect to test database");

        farmhub_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = Arc::new(farmhub_database::repositories::user::UserRepository::new(
            db_pool.clone(),
        ));
        let refresh_repo = Arc::new(
            farmhub_database::repositories::refresh_token::RefreshTokenRepository::new(
                db_pool.clone(),
            ),
        );
        let revoked_repo = Arc::new(
            farmhub_database::repositories::revoked_token::RevokedTokenRepository::new(
                db_pool.clone(),
            ),
        );
        let attempt_repo = Arc::new(
            farmhub_database::repositories::login_attempt::LoginAttemptRepository::new(
                db_pool.clone(),
            ),
        );
        let event_repo = Arc::new(
            farmhub_database::repositories::security_event::SecurityEventRepository::new(
                db_pool.clone(),
            ),
        );

        let password_hasher = Arc::new(farmhub_auth::password::PasswordHasher::new());
        let password_validator =
            Arc::new(farmhub_auth::password::PasswordValidator::new(&config.auth));
        let jwt_encoder = Arc::new(farmhub_auth::jwt::JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(farmhub_auth::jwt::JwtDecoder::new(&config.auth));
        let refresh_store = Arc::new(farmhub_auth::session::RefreshTokenStore::new(
            Arc::clone(&refresh_repo),
            &config.auth,
        ));
        let revocation = Arc::new(farmhub_auth::session::RevocationLedger::new(Arc::clone(
            &revoked_repo,
        )));
        let limiter = Arc::new(farmhub_auth::lockout::LoginAttemptLimiter::new(
            Arc::clone(&attempt_repo),
            &config.auth,
        ));
        let audit = Arc::new(farmhub_auth::session::SecurityAudit::new(Arc::clone(
            &event_repo,
        )));

        let session_manager = Arc::new(farmhub_auth::session::SessionManager::new(
            user_repo,
            jwt_encoder,
            jwt_decoder,
            password_hasher,
            password_validator,
            refresh_store,
            revocation,
            limiter,
            audit,
        ));

        let app_state = farmhub_api::state::AppState {
            config: Arc::new(config.clone()),
            db_pool: db_pool.clone(),
            session_manager,
        };

        let router = farmhub_api::router::build_router(app_state);

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        use tower::ServiceExt;

        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sign up a user and return the live session
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Session {
        let response = self
            .request(
                "POST",
                "/api/auth/signup",
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                    "name": name,
                })),
                &[],
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Signup failed: {:?}",
            response.body
        );

        Session::from_response(&response)
    }

    /// Count audit rows of one event type
    pub async fn count_events(&self, event_type: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM security_events WHERE event_type = $1")
            .bind(event_type)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count security events")
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Extract the refresh token value from the Set-Cookie header
    pub fn refresh_cookie(&self) -> Option<String> {
        self.headers
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("refresh_token="))
            .and_then(|v| v.split(';').next())
            .and_then(|v| v.strip_prefix("refresh_token="))
            .map(String::from)
    }

    /// The machine-readable error code, if this is an error response
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error")?.get("code")?.as_str()
    }
}

/// A live session captured from a signup/login/refresh response
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer access token
    pub access_token: String,
    /// Refresh token value as set in the cookie
    pub refresh_cookie: String,
    /// CSRF token from the response body
    pub csrf_token: String,
    /// User ID from the response body
    pub user_id: String,
}

impl Session {
    /// Capture session material from a session-bundle response
    pub fn from_response(response: &TestResponse) -> Self {
        let access_token = response
            .body
            .get("accessToken")
            .and_then(|v| v.as_str())
            .expect("No accessToken in response")
            .to_string();
        let csrf_token = response
            .body
            .get("csrfToken")
            .and_then(|v| v.as_str())
            .expect("No csrfToken in response")
            .to_string();
        let refresh_cookie = response
            .refresh_cookie()
            .expect("No refresh_token Set-Cookie in response");
        let user_id = response
            .body
            .get("user")
            .and_then(|u| u.get("id"))
            .and_then(|v| v.as_str())
            .expect("No user.id in response")
            .to_string();

        Self {
            access_token,
            refresh_cookie,
            csrf_token,
            user_id,
        }
    }

    /// Authorization header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Cookie header value carrying the refresh token
    pub fn cookie(&self) -> String {
        format!("refresh_token={}", self.refresh_cookie)
    }
}
