//! Farmhub Auth Server
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use farmhub_core::config::AppConfig;
use farmhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("FARMHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Farmhub auth server v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = farmhub_database::connection::create_pool(&config.database).await?;

    farmhub_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Initialize repositories ──────────────────────────
    let user_repo = Arc::new(farmhub_database::repositories::user::UserRepository::new(
        db_pool.clone(),
    ));
    let refresh_repo = Arc::new(
        farmhub_database::repositories::refresh_token::RefreshTokenRepository::new(db_pool.clone()),
    );
    let revoked_repo = Arc::new(
        farmhub_database::repositories::revoked_token::RevokedTokenRepository::new(db_pool.clone()),
    );
    let attempt_repo = Arc::new(
        farmhub_database::repositories::login_attempt::LoginAttemptRepository::new(db_pool.clone()),
    );
    let event_repo = Arc::new(
        farmhub_database::repositories::security_event::SecurityEventRepository::new(
            db_pool.clone(),
        ),
    );

    // ── Step 3: Initialize auth system ───────────────────────────
    tracing::info!("Initializing authentication system...");
    let password_hasher = Arc::new(farmhub_auth::password::PasswordHasher::new());
    let password_validator = Arc::new(farmhub_auth::password::PasswordValidator::new(&config.auth));
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
        Arc::clone(&user_repo),
        Arc::clone(&jwt_encoder),
        Arc::clone(&jwt_decoder),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
        Arc::clone(&refresh_store),
        Arc::clone(&revocation),
        Arc::clone(&limiter),
        Arc::clone(&audit),
    ));

    // ── Step 4: Build and start HTTP server ──────────────────────
    let app_state = farmhub_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        session_manager,
    };

    let app = farmhub_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Farmhub auth server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    db_pool.close().await;
    tracing::info!("Farmhub auth server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
