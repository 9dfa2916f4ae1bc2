//! Record store for routes, vendors, items and bills
//!
//! [`PgStore`] persists to PostgreSQL; [`MemoryStore`] keeps everything in
//! process and backs local runs and tests.

use async_trait::async_trait;
use uuid::Uuid;

use shared::models::{
    Bill, CreateRouteInput, CreateVendorInput, Item, ItemInput, NewBill, Route, Vendor,
};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence operations over the four record collections
///
/// Reads come back fully nested: vendors carry their route, bills carry
/// their vendor (with route) and lines with their items.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name of the backing store, reported by the health check
    fn backend_name(&self) -> &'static str;

    /// Check the store is reachable
    async fn ping(&self) -> AppResult<()>;

    async fn create_route(&self, input: CreateRouteInput) -> AppResult<Route>;

    /// All routes, by name
    async fn list_routes(&self) -> AppResult<Vec<Route>>;

    /// Add a vendor; fails with not-found when the route does not exist
    async fn create_vendor(&self, input: CreateVendorInput) -> AppResult<Vendor>;

    /// Vendors of one route, or of all routes, by name
    async fn list_vendors(&self, route_id: Option<Uuid>) -> AppResult<Vec<Vendor>>;

    async fn create_item(&self, input: ItemInput) -> AppResult<Item>;

    /// All items, by English name
    async fn list_items(&self) -> AppResult<Vec<Item>>;

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>>;

    /// Replace every field of an item
    async fn update_item(&self, id: Uuid, input: ItemInput) -> AppResult<Item>;

    /// Delete an item and every bill line referencing it
    ///
    /// Parent bills keep their stored totals.
    async fn delete_item(&self, id: Uuid) -> AppResult<Item>;

    /// Insert a bill and its lines atomically, totals stored as supplied
    async fn create_bill(&self, bill: NewBill) -> AppResult<Bill>;

    /// All bills, most recent first
    async fn list_bills(&self) -> AppResult<Vec<Bill>>;

    async fn get_bill(&self, id: Uuid) -> AppResult<Option<Bill>>;

    /// Delete a bill's lines then the bill, in one transaction
    async fn delete_bill(&self, id: Uuid) -> AppResult<Bill>;
}
