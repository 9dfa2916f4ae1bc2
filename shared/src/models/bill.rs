//! Bills and their line items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Item, Vendor};
use crate::calculator::{checked_add, checked_mul, AmountOverflow};

/// An invoice issued to a vendor
///
/// `total` and `gst_total` are snapshots taken when the bill was created and
/// are never recomputed from the lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub gst_total: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
    #[serde(default, rename = "items")]
    pub lines: Vec<BillLine>,
}

impl Bill {
    /// Pre-tax total plus GST
    pub fn net_total(&self) -> Result<Decimal, AmountOverflow> {
        checked_add(self.total, self.gst_total)
    }
}

/// One item line on a bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    /// Item rate at the time the bill was created
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

impl BillLine {
    /// Pre-tax amount of this line
    pub fn amount(&self) -> Result<Decimal, AmountOverflow> {
        checked_mul(self.quantity, self.rate)
    }
}

/// Input for creating a bill
///
/// Totals are computed by the caller and stored as supplied.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillInput {
    pub vendor_id: Uuid,
    /// ISO-8601 timestamp or calendar date
    #[validate(length(min = 1, message = "Bill date is required"))]
    pub date: String,
    pub items: Vec<BillLineInput>,
    pub total: Decimal,
    pub gst_total: Decimal,
}

/// A line of a bill being created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// A validated bill ready to be persisted
#[derive(Debug, Clone)]
pub struct NewBill {
    pub vendor_id: Uuid,
    pub date: DateTime<Utc>,
    pub lines: Vec<BillLineInput>,
    pub total: Decimal,
    pub gst_total: Decimal,
}
