//! Report document layout
//!
//! Turns bills and their lookups into a paginated, renderer-agnostic
//! document: an overview page for a summary export, one page per bill, and a
//! letterhead plus page footer on every page. Long tables continue on
//! following pages. Nothing here touches storage or produces bytes.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::{checked_add, index_items, line_amount};
use crate::models::{Bill, Item, Vendor};
use crate::summary::{overall_summary, LocalCalendar, SummaryError, SummaryFilter, ITEM_NOT_FOUND};
use crate::types::{format_amount, format_money, format_quantity};

/// Table rows that fit on a page below the letterhead
pub const DEFAULT_ROWS_PER_PAGE: usize = 28;

/// Firm details printed at the top and bottom of every page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Letterhead {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub pan: String,
    pub contact: String,
    pub bank: String,
}

impl Letterhead {
    pub fn tax_line(&self) -> String {
        format!("GSTIN: {} | PAN: {}", self.gstin, self.pan)
    }

    pub fn contact_line(&self) -> String {
        format!("Contact: {}", self.contact)
    }
}

/// A table with a header row, body rows and label/value footer rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Table {
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
    /// Footer rows: the label spans every column but the last
    pub foot: Vec<(String, String)>,
}

/// One physical page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    /// Text lines printed between the title and the table
    pub lines: Vec<String>,
    pub table: Option<Table>,
}

/// A paginated document ready for rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub file_name: String,
    pub letterhead: Letterhead,
    pub pages: Vec<Page>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Footer text for a 1-based page number
    pub fn page_label(&self, page_number: usize) -> String {
        format!("Page {} of {}", page_number, self.page_count())
    }
}

/// Layout settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub rows_per_page: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// File name for a single bill export
pub fn bill_file_name(vendor_name: &str, export_date: NaiveDate) -> String {
    format!("bill-{}-{}.pdf", vendor_name, export_date.format("%Y-%m-%d"))
}

/// File name for a summary export
pub fn summary_file_name(filter: &SummaryFilter, export_date: NaiveDate) -> String {
    format!("summary-{}-{}.pdf", filter.kind(), export_date.format("%Y-%m-%d"))
}

/// Document for a filtered set of bills: overview page, then one page per
/// bill, most recent first
#[allow(clippy::too_many_arguments)]
pub fn summary_document(
    bills: &[Bill],
    items: &[Item],
    vendors: &[Vendor],
    filter: &SummaryFilter,
    letterhead: &Letterhead,
    calendar: &LocalCalendar,
    export_date: NaiveDate,
    options: LayoutOptions,
) -> Result<ReportDocument, SummaryError> {
    let item_index = index_items(items);
    let vendor_index: HashMap<Uuid, &Vendor> = vendors.iter().map(|v| (v.id, v)).collect();

    let mut pages = overview_pages(bills, items, filter, options)?;

    let mut ordered: Vec<&Bill> = bills.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));
    for bill in ordered {
        let vendor = vendor_index
            .get(&bill.vendor_id)
            .copied()
            .or(bill.vendor.as_ref());
        pages.extend(bill_pages(bill, &item_index, vendor, calendar, options)?);
    }

    Ok(ReportDocument {
        title: format!("Overall Summary {}", filter.description()),
        file_name: summary_file_name(filter, export_date),
        letterhead: letterhead.clone(),
        pages,
    })
}

/// Document for a single bill
pub fn bill_document(
    bill: &Bill,
    items: &[Item],
    vendor: Option<&Vendor>,
    letterhead: &Letterhead,
    calendar: &LocalCalendar,
    export_date: NaiveDate,
    options: LayoutOptions,
) -> Result<ReportDocument, SummaryError> {
    let item_index = index_items(items);
    let vendor = vendor.or(bill.vendor.as_ref());
    let vendor_name = vendor.map(|v| v.name.as_str()).unwrap_or("N/A");

    Ok(ReportDocument {
        title: format!("Bill for {}", vendor_name),
        file_name: bill_file_name(vendor_name, export_date),
        letterhead: letterhead.clone(),
        pages: bill_pages(bill, &item_index, vendor, calendar, options)?,
    })
}

fn overview_pages(
    bills: &[Bill],
    items: &[Item],
    filter: &SummaryFilter,
    options: LayoutOptions,
) -> Result<Vec<Page>, SummaryError> {
    let overall = overall_summary(bills, items)?;
    let lines = vec![
        format!("Total Bills: {}", overall.bill_count),
        format!("Total Amount: {}", format_money(overall.total)),
        format!("Total GST: {}", format_money(overall.gst_total)),
        format!("Net Total: {}", format_money(overall.net_total)),
    ];
    let table = Table {
        head: columns(&[
            "Item Name",
            "Total Qty",
            "Amount (w/o tax)",
            "Total GST",
            "Total Amount (w/ tax)",
        ]),
        body: overall
            .item_summary
            .iter()
            .map(|entry| {
                vec![
                    entry.display_name().to_string(),
                    format_quantity(entry.total_quantity),
                    format_money(entry.total_amount),
                    format_money(entry.gst_amount),
                    format_money(entry.total_with_tax),
                ]
            })
            .collect(),
        foot: Vec::new(),
    };

    Ok(paginate(
        format!("Overall Summary {}", filter.description()),
        lines,
        table,
        options,
    ))
}

fn bill_pages(
    bill: &Bill,
    items: &HashMap<Uuid, Item>,
    vendor: Option<&Vendor>,
    calendar: &LocalCalendar,
    options: LayoutOptions,
) -> Result<Vec<Page>, SummaryError> {
    let title = format!("Bill for {}", vendor.map(|v| v.name.as_str()).unwrap_or("N/A"));

    let mut lines = vec![format!("Date: {}", calendar.format_day(bill.date))];
    if let Some(vendor) = vendor {
        lines.push(format!("Vendor: {}", vendor.name));
        lines.push(format!("Route: {}", vendor.route_name()));
        lines.push(format!(
            "Contact: {}",
            vendor.contact.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!(
            "Address: {}",
            vendor.address.as_deref().unwrap_or("N/A")
        ));
    }

    let mut subtotal = Decimal::ZERO;
    let mut gst_total = Decimal::ZERO;
    let mut body = Vec::with_capacity(bill.lines.len());
    for line in &bill.lines {
        let item = items.get(&line.item_id);
        let amounts = line_amount(line.quantity, line.rate, item)?;
        subtotal = checked_add(subtotal, amounts.amount)?;
        gst_total = checked_add(gst_total, amounts.gst)?;
        body.push(vec![
            item.map(|i| i.name_en.clone())
                .unwrap_or_else(|| ITEM_NOT_FOUND.to_string()),
            format_quantity(line.quantity),
            format_amount(line.rate),
            format_amount(amounts.amount),
            format_amount(amounts.gst),
            format_amount(amounts.amount_with_tax),
        ]);
    }
    let grand_total = checked_add(subtotal, gst_total)?;

    let table = Table {
        head: columns(&[
            "Item",
            "Qty",
            "Rate",
            "Amount (w/o tax)",
            "GST",
            "Amount (w/ tax)",
        ]),
        body,
        foot: vec![
            ("Sub-Total".to_string(), format_money(subtotal)),
            ("GST".to_string(), format_money(gst_total)),
            ("Grand Total".to_string(), format_money(grand_total)),
        ],
    };

    Ok(paginate(title, lines, table, options))
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Split a titled table across pages
///
/// The first page loses one row of capacity per text line. Footer rows stay
/// together on the last page, which gets a page of its own if they do not fit.
fn paginate(title: String, lines: Vec<String>, table: Table, options: LayoutOptions) -> Vec<Page> {
    let capacity = options.rows_per_page.max(1);
    let first_capacity = capacity.saturating_sub(lines.len()).max(1);

    let Table { head, body, foot } = table;
    let mut chunks: Vec<Vec<Vec<String>>> = Vec::new();
    let mut rows = body.into_iter().peekable();
    let mut page_capacity = first_capacity;
    loop {
        let chunk: Vec<Vec<String>> = rows.by_ref().take(page_capacity).collect();
        chunks.push(chunk);
        if rows.peek().is_none() {
            break;
        }
        page_capacity = capacity;
    }

    let last_capacity = if chunks.len() == 1 { first_capacity } else { capacity };
    let last_len = chunks.last().map(Vec::len).unwrap_or(0);
    if !foot.is_empty() && last_len > 0 && last_len + foot.len() > last_capacity {
        chunks.push(Vec::new());
    }

    let page_total = chunks.len();
    let mut pages = Vec::with_capacity(page_total);
    for (index, chunk) in chunks.into_iter().enumerate() {
        let is_last = index + 1 == page_total;
        pages.push(Page {
            title: if index == 0 {
                title.clone()
            } else {
                format!("{} (continued)", title)
            },
            lines: if index == 0 { lines.clone() } else { Vec::new() },
            table: Some(Table {
                head: head.clone(),
                body: chunk,
                foot: if is_last { foot.clone() } else { Vec::new() },
            }),
        });
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillLine, Route};
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn letterhead() -> Letterhead {
        Letterhead {
            name: "Sample Traders".to_string(),
            address: "Market Yard".to_string(),
            gstin: "24ABCDE1234F1Z5".to_string(),
            pan: "ABCDE1234F".to_string(),
            contact: "9000000000".to_string(),
            bank: "Bank A/C 123".to_string(),
        }
    }

    fn rice() -> Item {
        Item {
            id: Uuid::from_u128(1),
            name_en: "Rice".to_string(),
            name_gu: String::new(),
            rate: dec("50"),
            has_gst: true,
            gst_percentage: Some(dec("5")),
            created_at: Utc::now(),
        }
    }

    fn vendor() -> Vendor {
        let route_id = Uuid::from_u128(7);
        Vendor {
            id: Uuid::from_u128(8),
            name: "Patel Stores".to_string(),
            contact: None,
            address: Some("Station Road".to_string()),
            route_id,
            created_at: Utc::now(),
            route: Some(Route {
                id: route_id,
                name: "North".to_string(),
                description: None,
                created_at: Utc::now(),
            }),
        }
    }

    fn bill(day: u32, lines: usize) -> Bill {
        let id = Uuid::new_v4();
        let lines: Vec<BillLine> = (0..lines)
            .map(|_| BillLine {
                id: Uuid::new_v4(),
                bill_id: id,
                item_id: rice().id,
                quantity: dec("10"),
                rate: dec("50"),
                item: None,
            })
            .collect();
        Bill {
            id,
            vendor_id: vendor().id,
            date: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            total: dec("500") * Decimal::from(lines.len()),
            gst_total: dec("25") * Decimal::from(lines.len()),
            created_at: Utc::now(),
            vendor: None,
            lines,
        }
    }

    fn export_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    #[test]
    fn test_summary_document_pages() {
        let bills = vec![bill(9, 1), bill(10, 2)];
        let doc = summary_document(
            &bills,
            &[rice()],
            &[vendor()],
            &SummaryFilter::All,
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            LayoutOptions::default(),
        )
        .unwrap();

        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.file_name, "summary-all-2024-01-20.pdf");
        assert_eq!(doc.pages[0].title, "Overall Summary for all dates");
        assert_eq!(doc.pages[0].lines[0], "Total Bills: 2");
        assert_eq!(doc.pages[0].lines[3], "Net Total: Rs. 1575.00");

        let overview = doc.pages[0].table.as_ref().unwrap();
        assert_eq!(overview.body.len(), 1);
        assert_eq!(overview.body[0][0], "Rice");
        assert_eq!(overview.body[0][1], "30");

        // most recent bill first
        let first_bill = doc.pages[1].table.as_ref().unwrap();
        assert_eq!(first_bill.body.len(), 2);
        assert_eq!(doc.pages[1].lines[0], "Date: 10/1/2024");
        assert!(doc.pages[1].lines.contains(&"Route: North".to_string()));
        assert!(doc.pages[1].lines.contains(&"Contact: N/A".to_string()));
        assert_eq!(doc.page_label(2), "Page 2 of 3");
    }

    #[test]
    fn test_bill_page_footer_rows() {
        let doc = bill_document(
            &bill(10, 1),
            &[rice()],
            Some(&vendor()),
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.file_name, "bill-Patel Stores-2024-01-20.pdf");
        let table = doc.pages[0].table.as_ref().unwrap();
        assert_eq!(
            table.body[0],
            vec!["Rice", "10", "50.00", "500.00", "25.00", "525.00"]
        );
        assert_eq!(
            table.foot,
            vec![
                ("Sub-Total".to_string(), "Rs. 500.00".to_string()),
                ("GST".to_string(), "Rs. 25.00".to_string()),
                ("Grand Total".to_string(), "Rs. 525.00".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_item_and_vendor() {
        let mut orphan = bill(10, 1);
        orphan.lines[0].item_id = Uuid::from_u128(404);
        let doc = bill_document(
            &orphan,
            &[rice()],
            None,
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.pages[0].title, "Bill for N/A");
        let table = doc.pages[0].table.as_ref().unwrap();
        assert_eq!(table.body[0][0], ITEM_NOT_FOUND);
        assert_eq!(table.body[0][4], "0.00");
    }

    #[test]
    fn test_long_tables_continue() {
        let options = LayoutOptions { rows_per_page: 10 };
        let doc = bill_document(
            &bill(10, 12),
            &[rice()],
            Some(&vendor()),
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            options,
        )
        .unwrap();
        // 5 text lines leave 5 rows on the first page, 7 rows remain
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].table.as_ref().unwrap().body.len(), 5);
        assert!(doc.pages[0].table.as_ref().unwrap().foot.is_empty());
        assert_eq!(doc.pages[1].title, "Bill for Patel Stores (continued)");
        assert!(doc.pages[1].lines.is_empty());
        assert_eq!(doc.pages[1].table.as_ref().unwrap().body.len(), 7);
        assert_eq!(doc.pages[1].table.as_ref().unwrap().foot.len(), 3);
    }

    #[test]
    fn test_footer_moves_to_its_own_page() {
        let options = LayoutOptions { rows_per_page: 10 };
        let doc = bill_document(
            &bill(10, 4),
            &[rice()],
            Some(&vendor()),
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            options,
        )
        .unwrap();
        // 4 rows fit beside 5 lines, the 3 footer rows do not
        assert_eq!(doc.page_count(), 2);
        assert!(doc.pages[1].table.as_ref().unwrap().body.is_empty());
        assert_eq!(doc.pages[1].table.as_ref().unwrap().foot.len(), 3);
    }

    #[test]
    fn test_empty_summary_still_has_overview() {
        let doc = summary_document(
            &[],
            &[],
            &[],
            &SummaryFilter::ExactDate("10/1/2024".to_string()),
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.file_name, "summary-custom-2024-01-20.pdf");
        assert_eq!(doc.pages[0].title, "Overall Summary from 10/1/2024");
    }

    #[test]
    fn test_bill_date_uses_local_calendar() {
        let calendar = LocalCalendar::from_offset_str("+05:30", "%d-%m-%Y").unwrap();
        let mut late = bill(10, 1);
        // 20:00 UTC on the 10th is the 11th in India
        late.date = Utc.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap();
        let doc = bill_document(
            &late,
            &[rice()],
            Some(&vendor()),
            &letterhead(),
            &calendar,
            export_date(),
            LayoutOptions::default(),
        )
        .unwrap();
        assert_eq!(doc.pages[0].lines[0], "Date: 11-01-2024");
    }

    #[test]
    fn test_overflowing_bill_is_an_error() {
        let mut huge = bill(10, 2);
        for line in &mut huge.lines {
            line.quantity = Decimal::MAX;
            line.rate = Decimal::ONE;
        }
        let result = bill_document(
            &huge,
            &[],
            None,
            &letterhead(),
            &LocalCalendar::utc(),
            export_date(),
            LayoutOptions::default(),
        );
        assert!(matches!(result, Err(SummaryError::Overflow(_))));
    }
}
