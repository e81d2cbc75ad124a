//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors go through
//! `account::AccountError` and `kernel::error::AppError`.

use account::domain::repository::{AuthTokenRepository, UserRepository};
use account::{
    AccountConfig, AccountError, InMemoryAccountRepository, PgAccountRepository, UserStore,
    account_router, account_router_generic,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 31113);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,account=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_account_config()?;

    // Account router over Postgres, or in-memory when no database is configured
    let account = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let repo = PgAccountRepository::new(pool);
            bootstrap_superuser(&repo, &config).await?;
            account_router(repo, config)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory only");
            let repo = InMemoryAccountRepository::new();
            bootstrap_superuser(&repo, &config).await?;
            account_router_generic(repo, config)
        }
    };

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
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new().nest("/api", account).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr = match env::var("BIND_ADDR") {
        Ok(value) => value.parse::<SocketAddr>()?,
        Err(_) => SocketAddr::from(DEFAULT_BIND_ADDR),
    };
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the account configuration from the environment
fn load_account_config() -> anyhow::Result<AccountConfig> {
    let config = AccountConfig::default();

    match env::var("PASSWORD_PEPPER") {
        Ok(pepper_b64) => {
            let pepper = Engine::decode(&general_purpose::STANDARD, pepper_b64.trim())?;
            Ok(config.with_pepper(pepper))
        }
        Err(_) => {
            tracing::warn!("PASSWORD_PEPPER not set, hashing without pepper");
            Ok(config)
        }
    }
}

/// Create the superuser named by `ADMIN_EMAIL` / `ADMIN_PASSWORD`
///
/// An account that already exists under that email is left untouched.
async fn bootstrap_superuser<R>(repo: &R, config: &AccountConfig) -> anyhow::Result<()>
where
    R: UserRepository + AuthTokenRepository + Clone + Send + Sync + 'static,
{
    let (Ok(email), Ok(password)) = (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) else {
        return Ok(());
    };

    let store = UserStore::new(Arc::new(repo.clone()), Arc::new(config.clone()));

    match store.get_by_email(&email).await {
        Ok(_) => {
            tracing::info!(email = %email, "Superuser already exists, skipping");
            return Ok(());
        }
        Err(AccountError::UserNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    match store.create_superuser(&email, password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.user_id, "Superuser bootstrapped");
            Ok(())
        }
        Err(AccountError::EmailTaken) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
