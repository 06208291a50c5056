use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::authorization::ports::SessionStore;
use account_service::domain::authorization::ports::TokenStore;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::AppState;
use account_service::outbound::repositories::PostgresAccountStore;
use account_service::outbound::repositories::PostgresSessionStore;
use account_service::outbound::repositories::PostgresTokenStore;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        rotation = ?config.auth.rotation,
        access_ttl_seconds = config.auth.access_ttl_seconds,
        refresh_ttl_seconds = config.auth.refresh_ttl_seconds,
        session_ttl_seconds = config.auth.session_ttl_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = config.password.hasher()?;
    let accounts = Arc::new(PostgresAccountStore::new(pg_pool.clone()));
    let tokens = Arc::new(PostgresTokenStore::new(pg_pool.clone()));
    let sessions = Arc::new(PostgresSessionStore::new(pg_pool));

    let state = AppState::new(
        accounts,
        Arc::clone(&tokens),
        Arc::clone(&sessions),
        &config.auth,
        password_hasher,
    );

    let purge_interval = config.auth.purge_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        loop {
            ticker.tick().await;
            purge_expired(tokens.as_ref(), sessions.as_ref()).await;
        }
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;
    tracing::info!("Server exited successfully");

    Ok(())
}

async fn purge_expired(tokens: &impl TokenStore, sessions: &impl SessionStore) {
    let now = Utc::now();

    match tokens.purge_expired(now).await {
        Ok(removed) => tracing::debug!(removed, "Purged expired refresh tokens"),
        Err(e) => tracing::error!(error = ?e, "Refresh token purge failed"),
    }

    match sessions.purge_expired(now).await {
        Ok(removed) => tracing::debug!(removed, "Purged expired sessions"),
        Err(e) => tracing::error!(error = ?e, "Session purge failed"),
    }
}
