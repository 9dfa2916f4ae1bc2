//! Route and vendor management service

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use shared::models::{CreateRouteInput, CreateVendorInput, Route, Vendor};
use shared::validate_name;

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

/// Route service for delivery routes and the vendors on them
#[derive(Clone)]
pub struct RouteService {
    store: Arc<dyn RecordStore>,
}

impl RouteService {
    /// Create a new RouteService instance
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create a route
    pub async fn create_route(&self, input: CreateRouteInput) -> AppResult<Route> {
        input.validate()?;
        validate_name(&input.name).map_err(|e| AppError::validation("name", e))?;

        let route = self.store.create_route(input).await?;
        tracing::info!(route_id = %route.id, name = %route.name, "Route created");
        Ok(route)
    }

    /// List all routes by name
    pub async fn list_routes(&self) -> AppResult<Vec<Route>> {
        self.store.list_routes().await
    }

    /// Add a vendor to an existing route
    pub async fn add_vendor(&self, input: CreateVendorInput) -> AppResult<Vendor> {
        input.validate()?;
        validate_name(&input.name).map_err(|e| AppError::validation("name", e))?;

        let route_id = input.route_id;
        let vendor = self.store.create_vendor(input).await.map_err(|e| {
            if matches!(e, AppError::NotFound(_)) {
                tracing::warn!(%route_id, "Vendor added to unknown route");
            }
            e
        })?;
        tracing::info!(vendor_id = %vendor.id, %route_id, "Vendor added");
        Ok(vendor)
    }

    /// List vendors of one route, or of every route
    pub async fn list_vendors(&self, route_id: Option<Uuid>) -> AppResult<Vec<Vendor>> {
        self.store.list_vendors(route_id).await
    }
}
