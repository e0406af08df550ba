//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors go through `auth::AuthError` / `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth::{AuthConfig, Authenticator, SqlAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use query::{AnyExecutor, PoolSettings};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DATABASE_URL: &str = "sqlite://auth.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,query=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let mut pool_settings = PoolSettings::default();
    if let Ok(raw) = env::var("DATABASE_MAX_CONNECTIONS") {
        pool_settings.max_connections = raw.trim().parse()?;
    }
    if let Ok(raw) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
        pool_settings.acquire_timeout = Duration::from_secs(raw.trim().parse()?);
    }

    let executor = AnyExecutor::connect(&database_url, &pool_settings).await?;
    tracing::info!(dialect = ?query::QueryExecutor::dialect(&executor), "Connected to database");

    let repository = SqlAuthRepository::new(executor)?;
    repository.initialize().await?;
    tracing::info!("Schema ready");

    let config = Arc::new(AuthConfig::from_env()?);
    if config.pepper().is_none() {
        tracing::warn!("PASSWORD_PEPPER not set, hashing without pepper");
    }

    let repository = Arc::new(repository);
    let authenticator = Authenticator::new(repository.clone(), repository, config)?;

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    match authenticator.purge_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth_router(authenticator))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
