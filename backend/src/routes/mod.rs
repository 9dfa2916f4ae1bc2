//! Route definitions for the Route Billing Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Delivery routes and their vendors
        .route("/routes", get(handlers::list_routes).post(handlers::create_route))
        .route("/vendors", get(handlers::list_vendors).post(handlers::add_vendor))
        // Item catalog
        .nest("/items", item_routes())
        // Bills
        .nest("/bills", bill_routes())
        // Daily summaries and exports
        .nest("/summary", summary_routes())
}

/// Item catalog routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
}

/// Bill routes
fn bill_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_bills).post(handlers::create_bill))
        .route("/quote", post(handlers::quote_bill))
        .route(
            "/:bill_id",
            get(handlers::get_bill).delete(handlers::delete_bill),
        )
        .route("/:bill_id/pdf", get(handlers::export_bill_pdf))
}

/// Summary routes
fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_summary))
        .route("/days", get(handlers::list_summary_days))
        .route("/pdf", get(handlers::export_summary_pdf))
}
