//! PDF export of single bills and filtered summaries

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use shared::report::{bill_document, summary_document, LayoutOptions, Letterhead};
use shared::summary::{filter_bills, LocalCalendar, SummaryFilter};

use crate::error::{AppError, AppResult};
use crate::pdf;
use crate::store::RecordStore;

/// A rendered export ready to download
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn RecordStore>,
    calendar: LocalCalendar,
    letterhead: Letterhead,
    layout: LayoutOptions,
}

impl ExportService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        calendar: LocalCalendar,
        letterhead: Letterhead,
        layout: LayoutOptions,
    ) -> Self {
        Self {
            store,
            calendar,
            letterhead,
            layout,
        }
    }

    /// Render one bill
    pub async fn bill_pdf(&self, bill_id: Uuid, now: DateTime<Utc>) -> AppResult<ExportFile> {
        let bill = self
            .store
            .get_bill(bill_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bill".to_string()))?;
        let items = self.store.list_items().await?;

        let document = bill_document(
            &bill,
            &items,
            bill.vendor.as_ref(),
            &self.letterhead,
            &self.calendar,
            now.date_naive(),
            self.layout,
        )?;
        let bytes = pdf::render(&document)?;
        tracing::info!(%bill_id, file = %document.file_name, "Bill exported");
        Ok(ExportFile {
            file_name: document.file_name,
            bytes,
        })
    }

    /// Render the overview and bill pages for a filter
    pub async fn summary_pdf(
        &self,
        filter: &SummaryFilter,
        now: DateTime<Utc>,
    ) -> AppResult<ExportFile> {
        let bills = self.store.list_bills().await?;
        let items = self.store.list_items().await?;
        let vendors = self.store.list_vendors(None).await?;

        let filtered = filter_bills(&bills, filter, &self.calendar, now);
        let document = summary_document(
            &filtered,
            &items,
            &vendors,
            filter,
            &self.letterhead,
            &self.calendar,
            now.date_naive(),
            self.layout,
        )?;
        let bytes = pdf::render(&document)?;
        tracing::info!(
            filter = filter.kind(),
            bills = filtered.len(),
            pages = document.page_count(),
            "Summary exported"
        );
        Ok(ExportFile {
            file_name: document.file_name,
            bytes,
        })
    }
}
