//! Route Billing Platform - Backend
//!
//! Delivery routes, their vendors, an item catalog and GST bills, with daily
//! summaries and PDF export.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::summary::LocalCalendar;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod pdf;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::{MemoryStore, PgStore, RecordStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
    /// Local calendar summaries group bills by
    pub calendar: LocalCalendar,
}

impl AppState {
    /// Build state, failing on an unusable report calendar
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> AppResult<Self> {
        let calendar = config.calendar()?;
        Ok(Self {
            store,
            config: Arc::new(config),
            calendar,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Route Billing Platform API v1.0"
}
