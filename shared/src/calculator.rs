//! Bill total and GST calculation
//!
//! Rates always come from the bill line, never from the live item, so a bill
//! keeps the prices it was created with. Values stay exact; rounding to two
//! places is a presentation concern. Every operation is checked: a result
//! outside the decimal range is an [`AmountOverflow`], never a panic.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BillLineInput, Item};

/// An amount left the representable decimal range
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Amount is too large to calculate")]
pub struct AmountOverflow;

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    a.checked_mul(b).ok_or(AmountOverflow)
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflow> {
    a.checked_add(b).ok_or(AmountOverflow)
}

/// Sum of `values`, failing on the first overflow
pub fn checked_sum<I>(values: I) -> Result<Decimal, AmountOverflow>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| checked_add(acc, value))
}

/// Amounts for a single bill line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineAmount {
    /// Pre-tax amount, quantity x rate
    pub amount: Decimal,
    pub gst: Decimal,
    pub amount_with_tax: Decimal,
}

/// Totals for a whole bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub gst_total: Decimal,
    pub grand_total: Decimal,
}

/// GST owed on a pre-tax amount for the given item
///
/// Zero when the item is unknown, untaxed, or has no percentage set.
pub fn gst_on(amount: Decimal, item: Option<&Item>) -> Result<Decimal, AmountOverflow> {
    match item.and_then(Item::applicable_gst) {
        Some(percentage) => gst_at(amount, percentage),
        None => Ok(Decimal::ZERO),
    }
}

/// GST on a pre-tax amount at an explicit percentage
pub fn gst_at(amount: Decimal, percentage: Decimal) -> Result<Decimal, AmountOverflow> {
    checked_mul(amount, percentage)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(AmountOverflow)
}

/// Amounts for one line
pub fn line_amount(
    quantity: Decimal,
    rate: Decimal,
    item: Option<&Item>,
) -> Result<LineAmount, AmountOverflow> {
    let amount = checked_mul(quantity, rate)?;
    let gst = gst_on(amount, item)?;
    Ok(LineAmount {
        amount,
        gst,
        amount_with_tax: checked_add(amount, gst)?,
    })
}

/// Totals over `(item, quantity, rate)` triples
pub fn calculate_bill<'a, I>(lines: I) -> Result<BillTotals, AmountOverflow>
where
    I: IntoIterator<Item = (Option<&'a Item>, Decimal, Decimal)>,
{
    let mut totals = BillTotals::default();
    for (item, quantity, rate) in lines {
        let line = line_amount(quantity, rate, item)?;
        totals.subtotal = checked_add(totals.subtotal, line.amount)?;
        totals.gst_total = checked_add(totals.gst_total, line.gst)?;
    }
    totals.grand_total = checked_add(totals.subtotal, totals.gst_total)?;
    Ok(totals)
}

/// A priced draft line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuotedLine {
    pub item_id: Uuid,
    pub name_en: Option<String>,
    pub quantity: Decimal,
    pub rate: Decimal,
    #[serde(flatten)]
    pub amounts: LineAmount,
}

/// Priced draft bill, the figures a client submits with `CreateBillInput`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillQuote {
    pub lines: Vec<QuotedLine>,
    #[serde(flatten)]
    pub totals: BillTotals,
}

/// Price draft lines against the catalog
pub fn quote(
    lines: &[BillLineInput],
    items: &HashMap<Uuid, Item>,
) -> Result<BillQuote, AmountOverflow> {
    let quoted = lines
        .iter()
        .map(|line| {
            let item = items.get(&line.item_id);
            Ok(QuotedLine {
                item_id: line.item_id,
                name_en: item.map(|i| i.name_en.clone()),
                quantity: line.quantity,
                rate: line.rate,
                amounts: line_amount(line.quantity, line.rate, item)?,
            })
        })
        .collect::<Result<Vec<_>, AmountOverflow>>()?;
    let totals = calculate_bill(
        lines
            .iter()
            .map(|line| (items.get(&line.item_id), line.quantity, line.rate)),
    )?;
    Ok(BillQuote {
        lines: quoted,
        totals,
    })
}

/// Index items by id
pub fn index_items(items: &[Item]) -> HashMap<Uuid, Item> {
    items.iter().map(|item| (item.id, item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(rate: &str, has_gst: bool, gst: Option<&str>) -> Item {
        Item {
            id: Uuid::new_v4(),
            name_en: "Rice".to_string(),
            name_gu: String::new(),
            rate: dec(rate),
            has_gst,
            gst_percentage: gst.map(dec),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_taxed_line() {
        let rice = item("50", true, Some("5"));
        let totals = calculate_bill([(Some(&rice), dec("10"), dec("50"))]).unwrap();
        assert_eq!(totals.subtotal, dec("500"));
        assert_eq!(totals.gst_total, dec("25"));
        assert_eq!(totals.grand_total, dec("525"));
    }

    #[test]
    fn test_untaxed_item_ignores_percentage() {
        let sugar = item("40", false, Some("12"));
        let totals = calculate_bill([(Some(&sugar), dec("2"), dec("40"))]).unwrap();
        assert_eq!(totals.subtotal, dec("80"));
        assert_eq!(totals.gst_total, Decimal::ZERO);
    }

    #[test]
    fn test_taxed_item_without_percentage() {
        let oil = item("100", true, None);
        assert_eq!(gst_on(dec("100"), Some(&oil)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_unknown_item_counts_toward_subtotal_only() {
        let totals = calculate_bill([(None, dec("3"), dec("7.5"))]).unwrap();
        assert_eq!(totals.subtotal, dec("22.5"));
        assert_eq!(totals.gst_total, Decimal::ZERO);
    }

    #[test]
    fn test_line_rate_wins_over_item_rate() {
        let rice = item("60", true, Some("5"));
        let totals = calculate_bill([(Some(&rice), dec("10"), dec("50"))]).unwrap();
        assert_eq!(totals.subtotal, dec("500"));
    }

    #[test]
    fn test_fractional_gst_is_exact() {
        let tea = item("33.33", true, Some("18"));
        let line = line_amount(dec("3"), dec("33.33"), Some(&tea)).unwrap();
        assert_eq!(line.amount, dec("99.99"));
        assert_eq!(line.gst, dec("17.9982"));
        assert_eq!(line.amount_with_tax, dec("117.9882"));
    }

    #[test]
    fn test_quote_mixes_lines() {
        let rice = item("50", true, Some("5"));
        let salt = item("20", false, None);
        let items = index_items(&[rice.clone(), salt.clone()]);
        let lines = vec![
            BillLineInput {
                item_id: rice.id,
                quantity: dec("10"),
                rate: dec("50"),
            },
            BillLineInput {
                item_id: salt.id,
                quantity: dec("4"),
                rate: dec("20"),
            },
        ];

        let quote = quote(&lines, &items).unwrap();
        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.lines[0].amounts.gst, dec("25"));
        assert_eq!(quote.lines[1].name_en, Some(salt.name_en.clone()));
        assert_eq!(quote.totals.subtotal, dec("580"));
        assert_eq!(quote.totals.gst_total, dec("25"));
        assert_eq!(quote.totals.grand_total, dec("605"));
    }

    #[test]
    fn test_empty_bill() {
        let totals = calculate_bill(Vec::<(Option<&Item>, Decimal, Decimal)>::new());
        assert_eq!(totals, Ok(BillTotals::default()));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let rice = item("50", true, Some("5"));
        assert_eq!(
            line_amount(Decimal::MAX, dec("50"), Some(&rice)),
            Err(AmountOverflow)
        );
        assert_eq!(
            calculate_bill([
                (None, Decimal::MAX, Decimal::ONE),
                (None, Decimal::MAX, Decimal::ONE),
            ]),
            Err(AmountOverflow)
        );
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), Err(AmountOverflow));
        assert_eq!(checked_sum([dec("500"), dec("300")]), Ok(dec("800")));
    }
}
