//! Route Billing Platform - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use route_billing_backend::{
    config::{Config, StoreBackend},
    create_app, AppState, MemoryStore, PgStore, RecordStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "billing_server=debug,route_billing_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Route Billing Server");
    tracing::info!("Environment: {}", config.environment);
    for warning in config.firm_warnings() {
        tracing::warn!("Firm details: {}", warning);
    }

    let store: Arc<dyn RecordStore> = match config.database.backend {
        StoreBackend::Postgres => {
            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Arc::new(PgStore::new(db_pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let host = config.server.host.clone();
    let port = config.server.port;

    // Create application state
    let state = AppState::new(store, config)
        .map_err(|e| anyhow::anyhow!("invalid report settings: {}", e))?;

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
