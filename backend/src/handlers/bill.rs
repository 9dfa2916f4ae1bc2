//! Bill HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{BillLineInput, CreateBillInput};

use super::{pdf_response, ApiJson};
use crate::error::AppError;
use crate::services::{BillService, ExportService};
use crate::AppState;

/// Draft lines to price
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<BillLineInput>,
}

/// Create a bill
pub async fn create_bill(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateBillInput>,
) -> impl IntoResponse {
    let service = BillService::new(state.store.clone());

    match service.create_bill(input).await {
        Ok(bill) => (StatusCode::CREATED, Json(bill)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all bills, most recent first
pub async fn list_bills(State(state): State<AppState>) -> impl IntoResponse {
    let service = BillService::new(state.store.clone());

    match service.list_bills().await {
        Ok(bills) => (StatusCode::OK, Json(bills)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a bill with its vendor and lines
pub async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BillService::new(state.store.clone());

    match service.get_bill(bill_id).await {
        Ok(Some(bill)) => (StatusCode::OK, Json(bill)).into_response(),
        Ok(None) => AppError::NotFound("Bill".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a bill and its lines
pub async fn delete_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BillService::new(state.store.clone());

    match service.delete_bill(bill_id).await {
        Ok(bill) => (StatusCode::OK, Json(bill)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Price draft lines before the bill is created
pub async fn quote_bill(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QuoteRequest>,
) -> impl IntoResponse {
    let service = BillService::new(state.store.clone());

    match service.quote(&request.items).await {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download one bill as PDF
pub async fn export_bill_pdf(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ExportService::new(
        state.store.clone(),
        state.calendar.clone(),
        state.config.letterhead(),
        state.config.layout(),
    );

    match service.bill_pdf(bill_id, Utc::now()).await {
        Ok(file) => pdf_response(file),
        Err(e) => e.into_response(),
    }
}
