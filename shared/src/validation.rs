//! Validation utilities for the route billing platform
//!
//! Includes India-specific checks for the tax identifiers printed on bills.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{BillLineInput, ItemInput};

// ============================================================================
// Catalog and Billing Validations
// ============================================================================

/// Largest quantity accepted on a single bill line
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest item or line rate
pub const MAX_RATE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Largest stored bill total or GST total (10^15)
pub const MAX_TOTAL: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Most decimal places accepted on quantities, rates and totals
pub const MAX_SCALE: u32 = 4;

/// Validate that a name is not blank
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    Ok(())
}

/// Validate an item rate (zero allowed for free items)
pub fn validate_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO {
        return Err("Rate cannot be negative");
    }
    if rate > MAX_RATE {
        return Err("Rate is too large");
    }
    if rate.scale() > MAX_SCALE {
        return Err("Rate has too many decimal places");
    }
    Ok(())
}

/// Validate a GST percentage is between 0 and 100
pub fn validate_gst_percentage(percentage: Decimal) -> Result<(), &'static str> {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err("GST percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate a bill line quantity is positive
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    if quantity.scale() > MAX_SCALE {
        return Err("Quantity has too many decimal places");
    }
    Ok(())
}

/// Validate item fields beyond what the input derive checks
///
/// A percentage on an untaxed item is accepted and ignored by calculations.
pub fn validate_item(input: &ItemInput) -> Result<(), (&'static str, &'static str)> {
    validate_name(&input.name_en).map_err(|e| ("nameEn", e))?;
    validate_rate(input.rate).map_err(|e| ("rate", e))?;
    if let Some(percentage) = input.gst_percentage {
        validate_gst_percentage(percentage).map_err(|e| ("gstPercentage", e))?;
    }
    Ok(())
}

/// Validate every line of a bill
pub fn validate_bill_lines(lines: &[BillLineInput]) -> Result<(), (&'static str, &'static str)> {
    for line in lines {
        validate_quantity(line.quantity).map_err(|e| ("items.quantity", e))?;
        validate_rate(line.rate).map_err(|e| ("items.rate", e))?;
    }
    Ok(())
}

/// Validate stored bill totals are not negative and stay summable
pub fn validate_totals(total: Decimal, gst_total: Decimal) -> Result<(), (&'static str, &'static str)> {
    if total < Decimal::ZERO {
        return Err(("total", "Total cannot be negative"));
    }
    if total > MAX_TOTAL {
        return Err(("total", "Total is too large"));
    }
    if gst_total < Decimal::ZERO {
        return Err(("gstTotal", "GST total cannot be negative"));
    }
    if gst_total > MAX_TOTAL {
        return Err(("gstTotal", "GST total is too large"));
    }
    Ok(())
}

/// Parse a bill date
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as
/// UTC, and bare `YYYY-MM-DD` taken as UTC midnight.
pub fn parse_bill_date(value: &str) -> Result<DateTime<Utc>, &'static str> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err("Date must be an ISO-8601 date or timestamp")
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// Validate PAN format: 5 letters, 4 digits, 1 letter
pub fn validate_pan(pan: &str) -> Result<(), &'static str> {
    let chars: Vec<char> = pan.trim().chars().collect();
    if chars.len() != 10 {
        return Err("PAN must be 10 characters");
    }
    let valid = chars[..5].iter().all(|c| c.is_ascii_uppercase())
        && chars[5..9].iter().all(|c| c.is_ascii_digit())
        && chars[9].is_ascii_uppercase();
    if !valid {
        return Err("Invalid PAN format");
    }
    Ok(())
}

/// Validate GSTIN format: 2-digit state code, PAN, entity code, `Z`, check
/// character
pub fn validate_gstin(gstin: &str) -> Result<(), &'static str> {
    let gstin = gstin.trim();
    if gstin.len() != 15 || !gstin.is_ascii() {
        return Err("GSTIN must be 15 characters");
    }
    let state = &gstin[..2];
    if !state.chars().all(|c| c.is_ascii_digit()) {
        return Err("GSTIN must start with a state code");
    }
    let state_code: u32 = state.parse().map_err(|_| "GSTIN must start with a state code")?;
    if state_code == 0 || state_code > 38 {
        return Err("Invalid GSTIN state code");
    }
    validate_pan(&gstin[2..12]).map_err(|_| "GSTIN does not contain a valid PAN")?;
    let tail: Vec<char> = gstin[12..].chars().collect();
    if !tail[0].is_ascii_alphanumeric() || tail[1] != 'Z' || !tail[2].is_ascii_alphanumeric() {
        return Err("Invalid GSTIN format");
    }
    Ok(())
}

/// Validate an Indian mobile number
/// Accepts: 9876543210, 98765-43210, +91 9876543210
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        12 if digits.starts_with("91") => &digits[2..],
        11 if digits.starts_with('0') => &digits[1..],
        _ => return Err("Invalid Indian phone number format"),
    };
    if !matches!(local.chars().next(), Some('6'..='9')) {
        return Err("Invalid Indian phone number format");
    }
    Ok(())
}
