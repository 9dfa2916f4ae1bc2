//! Daily summary handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use shared::summary::SummaryFilter;

use super::{pdf_response, ApiQuery};
use crate::error::AppError;
use crate::services::{ExportService, SummaryService};
use crate::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct SummaryQuery {
    /// `all`, `today`, `lastWeek`, `lastMonth` or `custom`
    pub filter: Option<String>,
    /// Formatted day for the `custom` filter
    pub date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

impl SummaryQuery {
    fn to_filter(&self) -> Result<SummaryFilter, AppError> {
        Ok(SummaryFilter::parse(
            self.filter.as_deref().unwrap_or("all"),
            self.date.as_deref(),
        )?)
    }
}

/// Daily summaries for a filter
pub async fn get_summary(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> impl IntoResponse {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let service = SummaryService::new(state.store.clone(), state.calendar.clone());

    let report = match service.daily_summaries(filter, Utc::now()).await {
        Ok(report) => report,
        Err(e) => return e.into_response(),
    };

    if query.format.as_deref() == Some("csv") {
        let file_name = format!("summary-{}.csv", report.filter.kind());
        return match SummaryService::export_to_csv(&report.days) {
            Ok(csv) => (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", file_name),
                    ),
                ],
                csv,
            )
                .into_response(),
            Err(e) => e.into_response(),
        };
    }

    (StatusCode::OK, Json(report)).into_response()
}

/// Days that have bills, for the exact-date picker
pub async fn list_summary_days(State(state): State<AppState>) -> impl IntoResponse {
    let service = SummaryService::new(state.store.clone(), state.calendar.clone());

    match service.available_days().await {
        Ok(days) => (StatusCode::OK, Json(days)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download the summary for a filter as PDF
pub async fn export_summary_pdf(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> impl IntoResponse {
    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let service = ExportService::new(
        state.store.clone(),
        state.calendar.clone(),
        state.config.letterhead(),
        state.config.layout(),
    );

    match service.summary_pdf(&filter, Utc::now()).await {
        Ok(file) => pdf_response(file),
        Err(e) => e.into_response(),
    }
}
