//! Vendors billed along a route

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Route;

/// A customer on a route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub route_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Owning route, populated by listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
}

impl Vendor {
    /// Route name for display, "N/A" when the route was not loaded
    pub fn route_name(&self) -> &str {
        self.route.as_ref().map(|r| r.name.as_str()).unwrap_or("N/A")
    }
}

/// Input for adding a vendor to a route
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorInput {
    #[validate(length(min = 1, max = 200, message = "Vendor name cannot be empty"))]
    pub name: String,
    pub route_id: Uuid,
    #[validate(length(max = 100))]
    pub contact: Option<String>,
    #[validate(length(max = 1000))]
    pub address: Option<String>,
}
