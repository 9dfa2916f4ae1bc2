//! Common types used across the platform

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Languages an item name is kept in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Gujarati,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Gujarati => "gu",
        }
    }
}

impl Item {
    /// Item name in the requested language, falling back to English
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::Gujarati if !self.name_gu.trim().is_empty() => &self.name_gu,
            _ => &self.name_en,
        }
    }
}

/// Currency symbol used on exported documents
///
/// The PDF built-in fonts cannot encode the rupee sign.
pub const CURRENCY_PREFIX: &str = "Rs. ";

/// Round a currency value to two places, half away from zero
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a value with exactly two decimals
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_currency(value))
}

/// Format a value as money with the currency prefix
pub fn format_money(value: Decimal) -> String {
    format!("{}{}", CURRENCY_PREFIX, format_amount(value))
}

/// Format a quantity without trailing zeros
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_amount_pads_and_rounds() {
        assert_eq!(format_amount(Decimal::from(500)), "500.00");
        assert_eq!(format_amount(Decimal::from_str("2.345").unwrap()), "2.35");
        assert_eq!(format_amount(Decimal::from_str("2.344").unwrap()), "2.34");
        assert_eq!(format_amount(Decimal::from_str("-1.005").unwrap()), "-1.01");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::from_str("525").unwrap()), "Rs. 525.00");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(Decimal::from_str("10.500").unwrap()), "10.5");
        assert_eq!(format_quantity(Decimal::from(3)), "3");
    }

    #[test]
    fn test_language_code() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Gujarati.code(), "gu");
    }
}
