//! Explicit client application state
//!
//! Holds what the billing screens share: the active tab, the selected route
//! and vendor, the day of the last created bill handed over to the summary
//! view, and the bill being drafted.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::{quote, AmountOverflow, BillQuote};
use crate::models::{BillLineInput, CreateBillInput, Item};
use crate::validation::validate_quantity;

/// Top-level screens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Routes,
    Items,
    Summary,
}

/// Shared client state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    pub active_tab: Tab,
    pub selected_route: Option<Uuid>,
    pub selected_vendor: Option<Uuid>,
    /// Day of the last created bill, consumed by the summary view
    pub exported_bill_date: Option<String>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tabs; leaving the summary drops a pending hand-off
    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        if tab != Tab::Summary {
            self.exported_bill_date = None;
        }
    }

    /// Select a route, clearing the vendor selection
    pub fn select_route(&mut self, route_id: Uuid) {
        self.selected_route = Some(route_id);
        self.selected_vendor = None;
    }

    pub fn select_vendor(&mut self, vendor_id: Option<Uuid>) {
        self.selected_vendor = vendor_id;
    }

    /// A bill was created: show the summary for its day
    pub fn bill_created(&mut self, day: String) {
        self.exported_bill_date = Some(day);
        self.active_tab = Tab::Summary;
    }

    /// Take the pending summary day, if any
    pub fn take_exported_bill_date(&mut self) -> Option<String> {
        self.exported_bill_date.take()
    }
}

/// A bill being assembled before submission
///
/// Lines snapshot the item rate at the moment they are added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BillDraft {
    pub vendor_id: Option<Uuid>,
    pub lines: Vec<BillLineInput>,
}

impl BillDraft {
    pub fn for_vendor(vendor_id: Uuid) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            lines: Vec::new(),
        }
    }

    /// Add a line at the item's current rate
    pub fn add_item(&mut self, item: &Item, quantity: Decimal) -> Result<(), &'static str> {
        validate_quantity(quantity)?;
        self.lines.push(BillLineInput {
            item_id: item.id,
            quantity,
            rate: item.rate,
        });
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> Option<BillLineInput> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quote(&self, items: &HashMap<Uuid, Item>) -> Result<BillQuote, AmountOverflow> {
        quote(&self.lines, items)
    }

    /// Build the create request, totals included
    pub fn to_input(
        &self,
        items: &HashMap<Uuid, Item>,
        date: String,
    ) -> Result<CreateBillInput, &'static str> {
        let vendor_id = self.vendor_id.ok_or("Select a vendor first")?;
        if self.lines.is_empty() {
            return Err("Add at least one item");
        }
        let totals = self
            .quote(items)
            .map_err(|_| "Amount is too large to calculate")?
            .totals;
        Ok(CreateBillInput {
            vendor_id,
            date,
            items: self.lines.clone(),
            total: totals.subtotal,
            gst_total: totals.gst_total,
        })
    }
}
