//! Route and vendor HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{CreateRouteInput, CreateVendorInput};

use super::{ApiJson, ApiQuery};
use crate::services::RouteService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuery {
    pub route_id: Option<Uuid>,
}

/// Create a new route
pub async fn create_route(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateRouteInput>,
) -> impl IntoResponse {
    let service = RouteService::new(state.store.clone());

    match service.create_route(input).await {
        Ok(route) => (StatusCode::CREATED, Json(route)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all routes
pub async fn list_routes(State(state): State<AppState>) -> impl IntoResponse {
    let service = RouteService::new(state.store.clone());

    match service.list_routes().await {
        Ok(routes) => (StatusCode::OK, Json(routes)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a vendor to a route
pub async fn add_vendor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateVendorInput>,
) -> impl IntoResponse {
    let service = RouteService::new(state.store.clone());

    match service.add_vendor(input).await {
        Ok(vendor) => (StatusCode::CREATED, Json(vendor)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List vendors, optionally for one route
pub async fn list_vendors(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<VendorQuery>,
) -> impl IntoResponse {
    let service = RouteService::new(state.store.clone());

    match service.list_vendors(query.route_id).await {
        Ok(vendors) => (StatusCode::OK, Json(vendors)).into_response(),
        Err(e) => e.into_response(),
    }
}
