//! In-process record store

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::models::{
    Bill, BillLine, CreateRouteInput, CreateVendorInput, Item, ItemInput, NewBill, Route, Vendor,
};

use super::RecordStore;
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    routes: Vec<Route>,
    vendors: Vec<Vendor>,
    items: Vec<Item>,
    /// Stored flat: no nested vendor, lines without items
    bills: Vec<Bill>,
}

impl Tables {
    fn route(&self, id: Uuid) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    fn nested_vendor(&self, vendor: &Vendor) -> Vendor {
        Vendor {
            route: self.route(vendor.route_id).cloned(),
            ..vendor.clone()
        }
    }

    fn nested_bill(&self, bill: &Bill) -> Bill {
        let vendor = self
            .vendors
            .iter()
            .find(|v| v.id == bill.vendor_id)
            .map(|v| self.nested_vendor(v));
        let lines = bill
            .lines
            .iter()
            .map(|line| BillLine {
                item: self.items.iter().find(|i| i.id == line.item_id).cloned(),
                ..line.clone()
            })
            .collect();
        Bill {
            vendor,
            lines,
            ..bill.clone()
        }
    }
}

/// Record store held in memory, lost on restart
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn create_route(&self, input: CreateRouteInput) -> AppResult<Route> {
        let route = Route {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            created_at: Utc::now(),
        };
        self.tables.write().await.routes.push(route.clone());
        Ok(route)
    }

    async fn list_routes(&self) -> AppResult<Vec<Route>> {
        let mut routes = self.tables.read().await.routes.clone();
        routes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(routes)
    }

    async fn create_vendor(&self, input: CreateVendorInput) -> AppResult<Vendor> {
        let mut tables = self.tables.write().await;
        let route = tables
            .route(input.route_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Route".to_string()))?;

        let vendor = Vendor {
            id: Uuid::new_v4(),
            name: input.name,
            contact: input.contact,
            address: input.address,
            route_id: input.route_id,
            created_at: Utc::now(),
            route: None,
        };
        tables.vendors.push(vendor.clone());
        Ok(Vendor {
            route: Some(route),
            ..vendor
        })
    }

    async fn list_vendors(&self, route_id: Option<Uuid>) -> AppResult<Vec<Vendor>> {
        let tables = self.tables.read().await;
        let mut vendors: Vec<Vendor> = tables
            .vendors
            .iter()
            .filter(|v| route_id.map_or(true, |id| v.route_id == id))
            .map(|v| tables.nested_vendor(v))
            .collect();
        vendors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(vendors)
    }

    async fn create_item(&self, input: ItemInput) -> AppResult<Item> {
        let item = Item {
            id: Uuid::new_v4(),
            name_en: input.name_en,
            name_gu: input.name_gu,
            rate: input.rate,
            has_gst: input.has_gst,
            gst_percentage: input.gst_percentage,
            created_at: Utc::now(),
        };
        self.tables.write().await.items.push(item.clone());
        Ok(item)
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let mut items = self.tables.read().await.items.clone();
        items.sort_by(|a, b| a.name_en.cmp(&b.name_en));
        Ok(items)
    }

    async fn get_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn update_item(&self, id: Uuid, input: ItemInput) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let item = tables
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        item.name_en = input.name_en;
        item.name_gu = input.name_gu;
        item.rate = input.rate;
        item.has_gst = input.has_gst;
        item.gst_percentage = input.gst_percentage;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        let position = tables
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        for bill in tables.bills.iter_mut() {
            bill.lines.retain(|line| line.item_id != id);
        }
        Ok(tables.items.remove(position))
    }

    async fn create_bill(&self, new_bill: NewBill) -> AppResult<Bill> {
        let mut tables = self.tables.write().await;
        if !tables.vendors.iter().any(|v| v.id == new_bill.vendor_id) {
            return Err(AppError::NotFound("Vendor".to_string()));
        }
        for line in &new_bill.lines {
            if !tables.items.iter().any(|i| i.id == line.item_id) {
                return Err(AppError::NotFound("Item".to_string()));
            }
        }

        let bill_id = Uuid::new_v4();
        let bill = Bill {
            id: bill_id,
            vendor_id: new_bill.vendor_id,
            date: new_bill.date,
            total: new_bill.total,
            gst_total: new_bill.gst_total,
            created_at: Utc::now(),
            vendor: None,
            lines: new_bill
                .lines
                .into_iter()
                .map(|line| BillLine {
                    id: Uuid::new_v4(),
                    bill_id,
                    item_id: line.item_id,
                    quantity: line.quantity,
                    rate: line.rate,
                    item: None,
                })
                .collect(),
        };
        tables.bills.push(bill.clone());
        Ok(tables.nested_bill(&bill))
    }

    async fn list_bills(&self) -> AppResult<Vec<Bill>> {
        let tables = self.tables.read().await;
        let mut bills: Vec<Bill> = tables.bills.iter().map(|b| tables.nested_bill(b)).collect();
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bills)
    }

    async fn get_bill(&self, id: Uuid) -> AppResult<Option<Bill>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bills
            .iter()
            .find(|b| b.id == id)
            .map(|b| tables.nested_bill(b)))
    }

    async fn delete_bill(&self, id: Uuid) -> AppResult<Bill> {
        let mut tables = self.tables.write().await;
        let position = tables
            .bills
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound("Bill".to_string()))?;

        let deleted = tables.nested_bill(&tables.bills[position]);
        tables.bills.remove(position);
        Ok(deleted)
    }
}
