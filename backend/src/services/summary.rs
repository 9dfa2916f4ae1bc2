//! Daily summary service
//! Groups stored bills by local calendar day and exports the rollups

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shared::summary::{
    available_days, filter_bills, found_message, overall_summary, summarize_days, DailySummary,
    LocalCalendar, OverallSummary, SummaryFilter,
};

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

/// Summary service over the record store
#[derive(Clone)]
pub struct SummaryService {
    store: Arc<dyn RecordStore>,
    calendar: LocalCalendar,
}

/// Daily summaries for a filter, with the overall rollup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub filter: SummaryFilter,
    pub message: String,
    pub overall: OverallSummary,
    pub days: Vec<DailySummary>,
}

/// One CSV row per day
#[derive(Debug, Serialize)]
pub struct DayRow {
    pub day: String,
    pub bill_count: usize,
    pub item_count: usize,
    pub total: Decimal,
    pub gst_total: Decimal,
    pub net_total: Decimal,
}

impl From<&DailySummary> for DayRow {
    fn from(day: &DailySummary) -> Self {
        Self {
            day: day.day.clone(),
            bill_count: day.bill_count,
            item_count: day.item_count,
            total: day.total,
            gst_total: day.gst_total,
            net_total: day.net_total,
        }
    }
}

impl SummaryService {
    pub fn new(store: Arc<dyn RecordStore>, calendar: LocalCalendar) -> Self {
        Self { store, calendar }
    }

    /// Summaries of the bills matching `filter`, most recent day first
    pub async fn daily_summaries(
        &self,
        filter: SummaryFilter,
        now: DateTime<Utc>,
    ) -> AppResult<SummaryReport> {
        let bills = self.store.list_bills().await?;
        let items = self.store.list_items().await?;

        let filtered = filter_bills(&bills, &filter, &self.calendar, now);
        let message = found_message(&filtered, &self.calendar);
        let overall = overall_summary(&filtered, &items)?;
        let days = summarize_days(filtered, &items, &self.calendar)?;

        tracing::debug!(filter = filter.kind(), days = days.len(), "Summaries computed");
        Ok(SummaryReport {
            filter,
            message,
            overall,
            days,
        })
    }

    /// Every day that has bills, most recent first
    pub async fn available_days(&self) -> AppResult<Vec<String>> {
        let bills = self.store.list_bills().await?;
        Ok(available_days(&bills, &self.calendar))
    }

    /// Export daily totals as CSV
    pub fn export_to_csv(days: &[DailySummary]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for day in days {
            wtr.serialize(DayRow::from(day))
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(data)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
