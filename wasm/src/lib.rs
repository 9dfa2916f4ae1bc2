//! WebAssembly module for the Route Billing Platform
//!
//! Provides client-side computation for:
//! - Bill line and GST totals while a bill is drafted
//! - GSTIN, PAN and phone checks before submission
//! - The billing screens' shared state and query cache

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::cache::{Mutation, QueryCache, QueryKey};
use shared::calculator::{checked_add, checked_mul, gst_at, index_items, quote};
use shared::session::{BillDraft, ClientState, Tab};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&"route billing module loaded".into());
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn parse_id(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id.trim()).map_err(|e| format!("Invalid id {}: {}", id, e))
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid amount {}: {}", value, e))
}

fn parse_tab(tab: &str) -> Result<Tab, String> {
    match tab {
        "routes" => Ok(Tab::Routes),
        "items" => Ok(Tab::Items),
        "summary" => Ok(Tab::Summary),
        other => Err(format!("Unknown tab {}", other)),
    }
}

fn price_lines(lines_json: &str, items_json: &str) -> Result<String, String> {
    let lines: Vec<BillLineInput> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid lines JSON: {}", e))?;
    let items: Vec<Item> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    let quote = quote(&lines, &index_items(&items)).map_err(|e| e.to_string())?;
    serde_json::to_string(&quote).map_err(|e| e.to_string())
}

fn gst_text(amount: &str, gst_percentage: &str) -> Result<String, String> {
    let amount = parse_decimal(amount)?;
    let percentage = parse_decimal(gst_percentage)?;
    let gst = gst_at(amount, percentage).map_err(|e| e.to_string())?;
    Ok(gst.normalize().to_string())
}

fn line_total_text(quantity: &str, rate: &str, gst_percentage: Option<&str>) -> Result<String, String> {
    let quantity = parse_decimal(quantity)?;
    let rate = parse_decimal(rate)?;
    let amount = checked_mul(quantity, rate).map_err(|e| e.to_string())?;
    let gst = match gst_percentage {
        Some(percentage) => gst_at(amount, parse_decimal(percentage)?).map_err(|e| e.to_string())?,
        None => Decimal::ZERO,
    };
    let total = checked_add(amount, gst).map_err(|e| e.to_string())?;
    Ok(total.normalize().to_string())
}

/// Price draft lines against a catalog, returning the quote as JSON
#[wasm_bindgen]
pub fn calculate_bill_totals(lines_json: &str, items_json: &str) -> Result<String, JsValue> {
    price_lines(lines_json, items_json).map_err(js_error)
}

/// GST on a pre-tax amount at a percentage, as a decimal string
#[wasm_bindgen]
pub fn calculate_gst(amount: &str, gst_percentage: &str) -> Result<String, JsValue> {
    gst_text(amount, gst_percentage).map_err(js_error)
}

/// Item name for the chosen display language (`en` or `gu`)
#[wasm_bindgen]
pub fn item_display_name(item_json: &str, language: &str) -> Result<String, JsValue> {
    let item: Item = serde_json::from_str(item_json)
        .map_err(|e| js_error(format!("Invalid item JSON: {}", e)))?;
    let language = match language {
        "gu" => Language::Gujarati,
        _ => Language::English,
    };
    Ok(item.name(language).to_string())
}

/// Check a GSTIN before it is printed on a letterhead
#[wasm_bindgen]
pub fn is_valid_gstin(gstin: &str) -> bool {
    validate_gstin(gstin).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_pan(pan: &str) -> bool {
    validate_pan(pan).is_ok()
}

/// Check a vendor contact number
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_indian_phone(phone).is_ok()
}

/// Client state, bill draft and query cache of one browser tab
#[wasm_bindgen]
#[derive(Default)]
pub struct ClientSession {
    state: ClientState,
    draft: BillDraft,
    catalog: HashMap<Uuid, Item>,
    cache: QueryCache<String>,
}

#[wasm_bindgen]
impl ClientSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ClientSession {
        ClientSession::default()
    }

    /// Replace the item catalog drafts are priced against
    pub fn set_catalog(&mut self, items_json: &str) -> Result<usize, JsValue> {
        let items: Vec<Item> = serde_json::from_str(items_json)
            .map_err(|e| js_error(format!("Invalid items JSON: {}", e)))?;
        self.catalog = index_items(&items);
        Ok(self.catalog.len())
    }

    pub fn set_active_tab(&mut self, tab: &str) -> Result<(), JsValue> {
        self.state.set_active_tab(parse_tab(tab).map_err(js_error)?);
        Ok(())
    }

    /// Select a route; clears the vendor and the draft
    pub fn select_route(&mut self, route_id: &str) -> Result<(), JsValue> {
        self.state.select_route(parse_id(route_id).map_err(js_error)?);
        self.draft = BillDraft::default();
        Ok(())
    }

    /// Select a vendor and start a fresh draft for them
    pub fn select_vendor(&mut self, vendor_id: Option<String>) -> Result<(), JsValue> {
        let vendor_id = vendor_id
            .as_deref()
            .map(parse_id)
            .transpose()
            .map_err(js_error)?;
        self.state.select_vendor(vendor_id);
        self.draft = vendor_id.map(BillDraft::for_vendor).unwrap_or_default();
        Ok(())
    }

    /// Add a catalog item to the draft at its current rate
    pub fn add_draft_line(&mut self, item_id: &str, quantity: &str) -> Result<usize, JsValue> {
        let item_id = parse_id(item_id).map_err(js_error)?;
        let quantity = parse_decimal(quantity).map_err(js_error)?;
        let item = self
            .catalog
            .get(&item_id)
            .ok_or_else(|| js_error("Item not found"))?;
        self.draft.add_item(item, quantity).map_err(js_error)?;
        Ok(self.draft.lines.len())
    }

    pub fn remove_draft_line(&mut self, index: usize) -> bool {
        self.draft.remove_line(index).is_some()
    }

    /// Quote of the current draft as JSON
    pub fn draft_quote(&self) -> Result<String, JsValue> {
        let quote = self.draft.quote(&self.catalog).map_err(js_error)?;
        serde_json::to_string(&quote).map_err(js_error)
    }

    /// Create-bill request body for the draft, dated now unless given
    pub fn draft_request(&self, date: Option<String>) -> Result<String, JsValue> {
        let date = date.unwrap_or_else(|| String::from(js_sys::Date::new_0().to_iso_string()));
        let input = self.draft.to_input(&self.catalog, date).map_err(js_error)?;
        serde_json::to_string(&input).map_err(js_error)
    }

    /// A bill was stored: hand its day to the summary view and reset the draft
    pub fn bill_created(&mut self, day: String) {
        self.state.bill_created(day);
        self.draft = self
            .state
            .selected_vendor
            .map(BillDraft::for_vendor)
            .unwrap_or_default();
        self.cache.apply(&Mutation::CreateBill);
    }

    pub fn take_exported_bill_date(&mut self) -> Option<String> {
        self.state.take_exported_bill_date()
    }

    /// Client state as JSON
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(js_error)
    }

    pub fn cache_put(&mut self, key_json: &str, value: String) -> Result<(), JsValue> {
        let key: QueryKey = serde_json::from_str(key_json).map_err(js_error)?;
        self.cache.insert(key, value);
        Ok(())
    }

    pub fn cache_get(&self, key_json: &str) -> Result<Option<String>, JsValue> {
        let key: QueryKey = serde_json::from_str(key_json).map_err(js_error)?;
        Ok(self.cache.get(&key).cloned())
    }

    /// Apply a mutation, returning the dropped keys as JSON
    pub fn apply_mutation(&mut self, mutation_json: &str) -> Result<String, JsValue> {
        let mutation: Mutation = serde_json::from_str(mutation_json).map_err(js_error)?;
        serde_json::to_string(&self.cache.apply(&mutation)).map_err(js_error)
    }
}

/// Line amount helper for item pickers, without a catalog lookup
#[wasm_bindgen]
pub fn calculate_line_total(quantity: &str, rate: &str, gst_percentage: Option<String>) -> Result<String, JsValue> {
    line_total_text(quantity, rate, gst_percentage.as_deref()).map_err(js_error)
}
