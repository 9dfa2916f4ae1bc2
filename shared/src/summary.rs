//! Daily summary aggregation
//!
//! Bills are filtered by a [`SummaryFilter`], grouped by their formatted local
//! calendar day, and rolled up per day and per item. The formatted day string
//! is the grouping key, so two bills share a group exactly when their
//! formatted dates are identical.

use std::collections::HashMap;

use chrono::format::{Item as FormatItem, StrftimeItems};
use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, Offset, TimeZone, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calculator::{checked_add, checked_sum, gst_on, index_items, AmountOverflow};
use crate::models::{Bill, Item};

/// Label shown for rollup entries whose item no longer exists
pub const ITEM_NOT_FOUND: &str = "Item not found";

/// Default display format for calendar days (day/month/year, no padding)
pub const DEFAULT_DATE_FORMAT: &str = "%-d/%-m/%Y";

/// Errors raised while building summaries
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Unknown summary filter: {0}")]
    UnknownFilter(String),

    #[error("A date is required for the custom filter")]
    MissingDate,

    #[error("Invalid UTC offset: {0}")]
    InvalidOffset(String),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error(transparent)]
    Overflow(#[from] AmountOverflow),
}

/// Which bills a summary covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "date", rename_all = "camelCase")]
pub enum SummaryFilter {
    #[default]
    All,
    Today,
    LastWeek,
    LastMonth,
    /// Bills whose formatted local date equals this string
    ExactDate(String),
}

impl SummaryFilter {
    /// Parse the filter kind used by the API (`all`, `today`, `lastWeek`,
    /// `lastMonth`, `custom`)
    pub fn parse(kind: &str, date: Option<&str>) -> Result<Self, SummaryError> {
        match kind {
            "all" | "" => Ok(SummaryFilter::All),
            "today" => Ok(SummaryFilter::Today),
            "lastWeek" => Ok(SummaryFilter::LastWeek),
            "lastMonth" => Ok(SummaryFilter::LastMonth),
            "custom" => match date.map(str::trim) {
                Some(d) if !d.is_empty() => Ok(SummaryFilter::ExactDate(d.to_string())),
                _ => Err(SummaryError::MissingDate),
            },
            other => Err(SummaryError::UnknownFilter(other.to_string())),
        }
    }

    /// API name of the filter kind, also used in export file names
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryFilter::All => "all",
            SummaryFilter::Today => "today",
            SummaryFilter::LastWeek => "lastWeek",
            SummaryFilter::LastMonth => "lastMonth",
            SummaryFilter::ExactDate(_) => "custom",
        }
    }

    /// Human description used in report titles
    pub fn description(&self) -> String {
        match self {
            SummaryFilter::All => "for all dates".to_string(),
            SummaryFilter::ExactDate(day) => format!("from {}", day),
            other => format!("for {}", other.kind()),
        }
    }
}

/// The local calendar bills are grouped in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
    date_format: String,
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl LocalCalendar {
    pub fn new(offset: FixedOffset, date_format: impl Into<String>) -> Self {
        Self {
            offset,
            date_format: date_format.into(),
        }
    }

    /// UTC calendar with the default day format
    pub fn utc() -> Self {
        Self::new(Utc.fix(), DEFAULT_DATE_FORMAT)
    }

    /// Build a calendar from an offset string such as `+05:30` or `-04:00`
    /// and a strftime day format, rejecting either if chrono cannot use it
    pub fn from_offset_str(offset: &str, date_format: &str) -> Result<Self, SummaryError> {
        Ok(Self::new(parse_offset(offset)?, check_date_format(date_format)?))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Calendar day of a timestamp in local time
    pub fn local_date(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.offset).date_naive()
    }

    /// Formatted local day, the grouping key
    pub fn format_day(&self, timestamp: DateTime<Utc>) -> String {
        timestamp
            .with_timezone(&self.offset)
            .format(&self.date_format)
            .to_string()
    }

    /// Parse a formatted day back into a date
    pub fn parse_day(&self, day: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(day, &self.date_format).ok()
    }

    /// Start of a local day, as a UTC instant
    pub fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
            return DateTime::<Utc>::MIN_UTC;
        };
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

/// Reject a strftime pattern chrono would fail to format with
pub fn check_date_format(date_format: &str) -> Result<&str, SummaryError> {
    let invalid = || SummaryError::InvalidDateFormat(date_format.to_string());
    if date_format.trim().is_empty() {
        return Err(invalid());
    }
    if StrftimeItems::new(date_format).any(|item| matches!(item, FormatItem::Error)) {
        return Err(invalid());
    }
    Ok(date_format)
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`
pub fn parse_offset(offset: &str) -> Result<FixedOffset, SummaryError> {
    let invalid = || SummaryError::InvalidOffset(offset.to_string());
    let trimmed = offset.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Rollup of one item across a set of bills
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRollup {
    pub item_id: Uuid,
    /// `None` when the item was deleted after billing
    pub item: Option<Item>,
    pub total_quantity: Decimal,
    /// Pre-tax amount
    pub total_amount: Decimal,
    pub gst_amount: Decimal,
    pub total_with_tax: Decimal,
}

impl ItemRollup {
    pub fn display_name(&self) -> &str {
        self.item
            .as_ref()
            .map(|item| item.name_en.as_str())
            .unwrap_or(ITEM_NOT_FOUND)
    }
}

/// All bills of one local calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Formatted day, the grouping key
    pub day: String,
    pub date: NaiveDate,
    pub bills: Vec<Bill>,
    pub total: Decimal,
    pub gst_total: Decimal,
    pub net_total: Decimal,
    pub bill_count: usize,
    pub item_count: usize,
    pub item_summary: Vec<ItemRollup>,
}

/// Totals over a whole filtered bill set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub bill_count: usize,
    pub total: Decimal,
    pub gst_total: Decimal,
    pub net_total: Decimal,
    pub item_summary: Vec<ItemRollup>,
}

#[derive(Default)]
struct ItemAccumulator {
    total_quantity: Decimal,
    total_amount: Decimal,
    gst_amount: Decimal,
}

/// Keep the bills matching `filter`, in input order
pub fn filter_bills(
    bills: &[Bill],
    filter: &SummaryFilter,
    calendar: &LocalCalendar,
    now: DateTime<Utc>,
) -> Vec<Bill> {
    let today = calendar.local_date(now);
    let today_start = calendar.local_midnight(today);

    // Today compares calendar days; the week and month windows compare raw
    // timestamps against a midnight cutoff.
    match filter {
        SummaryFilter::All => bills.to_vec(),
        SummaryFilter::Today => bills
            .iter()
            .filter(|bill| calendar.local_date(bill.date) == today)
            .cloned()
            .collect(),
        SummaryFilter::LastWeek => {
            let cutoff = today_start - Duration::days(7);
            bills
                .iter()
                .filter(|bill| bill.date >= cutoff)
                .cloned()
                .collect()
        }
        SummaryFilter::LastMonth => {
            let month_ago = today
                .checked_sub_months(Months::new(1))
                .unwrap_or(NaiveDate::MIN);
            let cutoff = calendar.local_midnight(month_ago);
            bills
                .iter()
                .filter(|bill| bill.date >= cutoff)
                .cloned()
                .collect()
        }
        SummaryFilter::ExactDate(day) => bills
            .iter()
            .filter(|bill| calendar.format_day(bill.date) == *day)
            .cloned()
            .collect(),
    }
}

/// Filter, group by day and roll up, most recent day first
pub fn aggregate(
    bills: &[Bill],
    items: &[Item],
    filter: &SummaryFilter,
    calendar: &LocalCalendar,
    now: DateTime<Utc>,
) -> Result<Vec<DailySummary>, SummaryError> {
    let filtered = filter_bills(bills, filter, calendar, now);
    summarize_days(filtered, items, calendar)
}

/// Group already-filtered bills into daily summaries, most recent day first
pub fn summarize_days(
    bills: Vec<Bill>,
    items: &[Item],
    calendar: &LocalCalendar,
) -> Result<Vec<DailySummary>, SummaryError> {
    let item_index = index_items(items);

    let mut by_day: IndexMap<String, (NaiveDate, Vec<Bill>)> = IndexMap::new();
    for bill in bills {
        let day = calendar.format_day(bill.date);
        let entry = by_day.entry(day.clone()).or_insert_with(|| {
            let date = calendar
                .parse_day(&day)
                .unwrap_or_else(|| calendar.local_date(bill.date));
            (date, Vec::new())
        });
        entry.1.push(bill);
    }

    let mut summaries: Vec<DailySummary> = by_day
        .into_iter()
        .map(|(day, (date, day_bills))| summarize_day(day, date, day_bills, &item_index))
        .collect::<Result<_, _>>()?;

    // Stable, so days whose keys parse to the same date keep first-seen order
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(summaries)
}

fn summarize_day(
    day: String,
    date: NaiveDate,
    bills: Vec<Bill>,
    items: &HashMap<Uuid, Item>,
) -> Result<DailySummary, SummaryError> {
    let total = checked_sum(bills.iter().map(|bill| bill.total))?;
    let gst_total = checked_sum(bills.iter().map(|bill| bill.gst_total))?;

    let mut rollup: IndexMap<Uuid, ItemAccumulator> = IndexMap::new();
    for line in bills.iter().flat_map(|bill| bill.lines.iter()) {
        let amount = line.amount()?;
        let acc = rollup.entry(line.item_id).or_default();
        acc.total_quantity = checked_add(acc.total_quantity, line.quantity)?;
        acc.total_amount = checked_add(acc.total_amount, amount)?;
    }

    // Daily GST is derived from the accumulated pre-tax amount
    let item_summary: Vec<ItemRollup> = rollup
        .into_iter()
        .map(|(item_id, acc)| {
            let item = items.get(&item_id).cloned();
            let gst_amount = gst_on(acc.total_amount, item.as_ref())?;
            Ok(ItemRollup {
                item_id,
                item,
                total_quantity: acc.total_quantity,
                total_amount: acc.total_amount,
                gst_amount,
                total_with_tax: checked_add(acc.total_amount, gst_amount)?,
            })
        })
        .collect::<Result<_, AmountOverflow>>()?;

    Ok(DailySummary {
        day,
        date,
        bill_count: bills.len(),
        item_count: item_summary.len(),
        total,
        gst_total,
        net_total: checked_add(total, gst_total)?,
        bills,
        item_summary,
    })
}

/// Totals and per-item rollup across every given bill
///
/// GST accumulates line by line here, while daily rollups derive it from the
/// summed amount. With exact decimals both agree.
pub fn overall_summary(bills: &[Bill], items: &[Item]) -> Result<OverallSummary, SummaryError> {
    let item_index = index_items(items);
    let total = checked_sum(bills.iter().map(|bill| bill.total))?;
    let gst_total = checked_sum(bills.iter().map(|bill| bill.gst_total))?;

    let mut rollup: IndexMap<Uuid, ItemAccumulator> = IndexMap::new();
    for line in bills.iter().flat_map(|bill| bill.lines.iter()) {
        let amount = line.amount()?;
        let gst = gst_on(amount, item_index.get(&line.item_id))?;
        let acc = rollup.entry(line.item_id).or_default();
        acc.total_quantity = checked_add(acc.total_quantity, line.quantity)?;
        acc.total_amount = checked_add(acc.total_amount, amount)?;
        acc.gst_amount = checked_add(acc.gst_amount, gst)?;
    }

    let item_summary: Vec<ItemRollup> = rollup
        .into_iter()
        .map(|(item_id, acc)| {
            Ok(ItemRollup {
                item_id,
                item: item_index.get(&item_id).cloned(),
                total_quantity: acc.total_quantity,
                total_amount: acc.total_amount,
                gst_amount: acc.gst_amount,
                total_with_tax: checked_add(acc.total_amount, acc.gst_amount)?,
            })
        })
        .collect::<Result<_, AmountOverflow>>()?;

    Ok(OverallSummary {
        bill_count: bills.len(),
        total,
        gst_total,
        net_total: checked_add(total, gst_total)?,
        item_summary,
    })
}

/// Distinct formatted days across all bills, most recent first
pub fn available_days(bills: &[Bill], calendar: &LocalCalendar) -> Vec<String> {
    let mut days: IndexMap<String, NaiveDate> = IndexMap::new();
    for bill in bills {
        days.entry(calendar.format_day(bill.date))
            .or_insert_with(|| calendar.local_date(bill.date));
    }
    let mut days: Vec<(String, NaiveDate)> = days.into_iter().collect();
    days.sort_by(|a, b| b.1.cmp(&a.1));
    days.into_iter().map(|(day, _)| day).collect()
}

/// Status line describing a filtered bill set
pub fn found_message(bills: &[Bill], calendar: &LocalCalendar) -> String {
    if bills.is_empty() {
        return "No bills found for the selected filter.".to_string();
    }
    let days: std::collections::HashSet<String> =
        bills.iter().map(|bill| calendar.format_day(bill.date)).collect();
    format!("Found {} bills on {} day(s).", bills.len(), days.len())
}
