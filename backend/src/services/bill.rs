//! Bill service: creation, lookup, deletion and quoting

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use shared::calculator::{index_items, quote, BillQuote};
use shared::models::{Bill, BillLineInput, CreateBillInput, NewBill};
use shared::{parse_bill_date, validate_bill_lines, validate_totals};

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct BillService {
    store: Arc<dyn RecordStore>,
}

impl BillService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate a create request into a bill ready to store
    fn prepare(input: CreateBillInput) -> AppResult<NewBill> {
        input.validate()?;
        let date = parse_bill_date(&input.date).map_err(|e| AppError::validation("date", e))?;
        if input.items.is_empty() {
            return Err(AppError::validation("items", "A bill needs at least one item"));
        }
        validate_bill_lines(&input.items)
            .map_err(|(field, message)| AppError::validation(field, message))?;
        validate_totals(input.total, input.gst_total)
            .map_err(|(field, message)| AppError::validation(field, message))?;

        Ok(NewBill {
            vendor_id: input.vendor_id,
            date,
            lines: input.items,
            total: input.total,
            gst_total: input.gst_total,
        })
    }

    /// Create a bill with the totals the caller computed
    ///
    /// Totals are stored as supplied; a mismatch with the line amounts is
    /// logged, not rejected.
    pub async fn create_bill(&self, input: CreateBillInput) -> AppResult<Bill> {
        let new_bill = Self::prepare(input)?;

        let items = self.store.list_items().await?;
        let expected = quote(&new_bill.lines, &index_items(&items))?.totals;
        if expected.subtotal != new_bill.total || expected.gst_total != new_bill.gst_total {
            tracing::warn!(
                vendor_id = %new_bill.vendor_id,
                supplied_total = %new_bill.total,
                supplied_gst = %new_bill.gst_total,
                computed_total = %expected.subtotal,
                computed_gst = %expected.gst_total,
                "Bill totals differ from line amounts"
            );
        }

        let bill = self.store.create_bill(new_bill).await?;
        tracing::info!(
            bill_id = %bill.id,
            vendor_id = %bill.vendor_id,
            lines = bill.lines.len(),
            "Bill created"
        );
        Ok(bill)
    }

    /// All bills, most recent first
    pub async fn list_bills(&self) -> AppResult<Vec<Bill>> {
        self.store.list_bills().await
    }

    pub async fn get_bill(&self, id: Uuid) -> AppResult<Option<Bill>> {
        let bill = self.store.get_bill(id).await?;
        if bill.is_none() {
            tracing::warn!(bill_id = %id, "Bill not found");
        }
        Ok(bill)
    }

    /// Delete a bill and its lines
    pub async fn delete_bill(&self, id: Uuid) -> AppResult<Bill> {
        let bill = self.store.delete_bill(id).await?;
        tracing::info!(bill_id = %id, "Bill deleted");
        Ok(bill)
    }

    /// Price draft lines against the current catalog
    pub async fn quote(&self, lines: &[BillLineInput]) -> AppResult<BillQuote> {
        validate_bill_lines(lines)
            .map_err(|(field, message)| AppError::validation(field, message))?;
        let items = self.store.list_items().await?;
        Ok(quote(lines, &index_items(&items))?)
    }
}
