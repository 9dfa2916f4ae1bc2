//! Catalog items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A sellable catalog item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name_en: String,
    /// Gujarati name
    pub name_gu: String,
    pub rate: Decimal,
    pub has_gst: bool,
    pub gst_percentage: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// GST percentage that actually applies to this item
    ///
    /// `None` when the item is untaxed, regardless of any stored percentage.
    pub fn applicable_gst(&self) -> Option<Decimal> {
        if self.has_gst {
            self.gst_percentage
        } else {
            None
        }
    }
}

/// Input for creating an item, also used as the full replacement on update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[validate(length(min = 1, max = 200, message = "English name cannot be empty"))]
    pub name_en: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub name_gu: String,
    pub rate: Decimal,
    pub has_gst: bool,
    pub gst_percentage: Option<Decimal>,
}
