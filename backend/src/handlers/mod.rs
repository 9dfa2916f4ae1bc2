//! HTTP handlers for the Route Billing Platform

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::services::export::ExportFile;

pub mod bill;
pub mod health;
pub mod item;
pub mod route;
pub mod summary;

pub use bill::*;
pub use health::*;
pub use item::*;
pub use route::*;
pub use summary::*;

/// JSON body whose decoding failures answer as validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose decoding failures answer as validation errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Download response for a rendered PDF
pub(crate) fn pdf_response(file: ExportFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", header_safe(&file.file_name));
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

/// Keep a file name printable inside a quoted header value
fn header_safe(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_safe() {
        assert_eq!(header_safe("bill-Patel Stores-2024-01-10.pdf"), "bill-Patel Stores-2024-01-10.pdf");
        assert_eq!(header_safe("bill-\"A\"\u{0AB0}-2024-01-10.pdf"), "bill-_A__-2024-01-10.pdf");
    }
}
