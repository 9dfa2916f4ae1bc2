//! Property tests for bill calculation and daily summaries

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use shared::calculator::{calculate_bill, index_items};
use shared::summary::{
    aggregate, available_days, filter_bills, overall_summary, LocalCalendar, SummaryFilter,
};
use shared::{Bill, BillLine, Item};

fn catalog() -> Vec<Item> {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    vec![
        Item {
            id: Uuid::from_u128(1),
            name_en: "Rice".to_string(),
            name_gu: String::new(),
            rate: Decimal::new(50, 0),
            has_gst: true,
            gst_percentage: Some(Decimal::new(5, 0)),
            created_at,
        },
        Item {
            id: Uuid::from_u128(2),
            name_en: "Salt".to_string(),
            name_gu: String::new(),
            rate: Decimal::new(20, 0),
            has_gst: false,
            gst_percentage: None,
            created_at,
        },
        Item {
            id: Uuid::from_u128(3),
            name_en: "Oil".to_string(),
            name_gu: String::new(),
            rate: Decimal::new(1450, 1),
            has_gst: true,
            gst_percentage: Some(Decimal::new(18, 0)),
            created_at,
        },
    ]
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// Strategy for a bill line: (item number 1..=4, quantity, rate)
/// Item 4 is not in the catalog.
fn line_strategy() -> impl Strategy<Value = (u128, Decimal, Decimal)> {
    (
        1u128..=4,
        (1i64..=500).prop_map(|n| Decimal::new(n, 1)),
        (0i64..=20000).prop_map(|n| Decimal::new(n, 2)),
    )
}

/// Strategy for a bill timestamp within ~90 days before `now`
fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..=90 * 24 * 60).prop_map(|minutes| now() - Duration::minutes(minutes))
}

fn bill_strategy() -> impl Strategy<Value = (DateTime<Utc>, Vec<(u128, Decimal, Decimal)>)> {
    (timestamp_strategy(), prop::collection::vec(line_strategy(), 1..5))
}

fn build_bills(raw: Vec<(DateTime<Utc>, Vec<(u128, Decimal, Decimal)>)>) -> Vec<Bill> {
    let items = index_items(&catalog());
    raw.into_iter()
        .enumerate()
        .map(|(n, (date, lines))| {
            let bill_id = Uuid::from_u128(1000 + n as u128);
            let lines: Vec<BillLine> = lines
                .into_iter()
                .enumerate()
                .map(|(k, (item, quantity, rate))| BillLine {
                    id: Uuid::from_u128(100_000 + (n * 10 + k) as u128),
                    bill_id,
                    item_id: Uuid::from_u128(item),
                    quantity,
                    rate,
                    item: None,
                })
                .collect();
            let totals = calculate_bill(
                lines
                    .iter()
                    .map(|line| (items.get(&line.item_id), line.quantity, line.rate)),
            )
            .unwrap();
            Bill {
                id: bill_id,
                vendor_id: Uuid::from_u128(500),
                date,
                total: totals.subtotal,
                gst_total: totals.gst_total,
                created_at: date,
                vendor: None,
                lines,
            }
        })
        .collect()
}

fn calendars() -> impl Strategy<Value = LocalCalendar> {
    prop_oneof![
        Just(LocalCalendar::utc()),
        Just(LocalCalendar::from_offset_str("+05:30", "%-d/%-m/%Y").unwrap()),
        Just(LocalCalendar::from_offset_str("-08:00", "%-d/%-m/%Y").unwrap()),
    ]
}

fn ids(bills: &[Bill]) -> HashSet<Uuid> {
    bills.iter().map(|bill| bill.id).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every bill lands in exactly one day, under its own formatted day
    #[test]
    fn prop_days_partition_bills(
        raw in prop::collection::vec(bill_strategy(), 0..30),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let days = aggregate(&bills, &catalog(), &SummaryFilter::All, &calendar, now()).unwrap();

        let grouped: usize = days.iter().map(|day| day.bill_count).sum();
        prop_assert_eq!(grouped, bills.len());

        let mut seen = HashSet::new();
        for day in &days {
            prop_assert_eq!(day.bill_count, day.bills.len());
            for bill in &day.bills {
                prop_assert!(seen.insert(bill.id));
                prop_assert_eq!(calendar.format_day(bill.date), day.day.clone());
            }
        }
    }

    /// Days come most recent first with distinct keys
    #[test]
    fn prop_days_descending(
        raw in prop::collection::vec(bill_strategy(), 0..30),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let days = aggregate(&bills, &catalog(), &SummaryFilter::All, &calendar, now()).unwrap();
        for pair in days.windows(2) {
            prop_assert!(pair[0].date > pair[1].date);
        }
        let listed = available_days(&bills, &calendar);
        let keys: Vec<String> = days.iter().map(|day| day.day.clone()).collect();
        prop_assert_eq!(listed, keys);
    }

    /// Day totals are the sums of their bills' stored totals
    #[test]
    fn prop_day_totals_sum_bills(
        raw in prop::collection::vec(bill_strategy(), 1..20),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let days = aggregate(&bills, &catalog(), &SummaryFilter::All, &calendar, now()).unwrap();
        for day in &days {
            let total: Decimal = day.bills.iter().map(|bill| bill.total).sum();
            let gst_total: Decimal = day.bills.iter().map(|bill| bill.gst_total).sum();
            prop_assert_eq!(day.total, total);
            prop_assert_eq!(day.gst_total, gst_total);
            prop_assert_eq!(day.net_total, total + gst_total);
            prop_assert_eq!(day.item_count, day.item_summary.len());
        }
    }

    /// Rolled-up item amounts across days match the overall rollup
    #[test]
    fn prop_daily_rollups_match_overall(
        raw in prop::collection::vec(bill_strategy(), 1..20),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let days = aggregate(&bills, &catalog(), &SummaryFilter::All, &calendar, now()).unwrap();
        let overall = overall_summary(&bills, &catalog()).unwrap();

        for entry in &overall.item_summary {
            let quantity: Decimal = days
                .iter()
                .flat_map(|day| day.item_summary.iter())
                .filter(|rollup| rollup.item_id == entry.item_id)
                .map(|rollup| rollup.total_quantity)
                .sum();
            let gst: Decimal = days
                .iter()
                .flat_map(|day| day.item_summary.iter())
                .filter(|rollup| rollup.item_id == entry.item_id)
                .map(|rollup| rollup.gst_amount)
                .sum();
            prop_assert_eq!(quantity, entry.total_quantity);
            prop_assert_eq!(gst, entry.gst_amount);
        }
        prop_assert_eq!(overall.gst_total, bills.iter().map(|b| b.gst_total).sum::<Decimal>());
    }

    /// Narrower windows select subsets of wider ones
    #[test]
    fn prop_filters_nest(
        raw in prop::collection::vec(bill_strategy(), 0..30),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let today = ids(&filter_bills(&bills, &SummaryFilter::Today, &calendar, now()));
        let week = ids(&filter_bills(&bills, &SummaryFilter::LastWeek, &calendar, now()));
        let month = ids(&filter_bills(&bills, &SummaryFilter::LastMonth, &calendar, now()));
        let all = ids(&filter_bills(&bills, &SummaryFilter::All, &calendar, now()));

        prop_assert!(today.is_subset(&week));
        prop_assert!(week.is_subset(&month));
        prop_assert!(month.is_subset(&all));
        prop_assert_eq!(all.len(), bills.len());
    }

    /// An exact day selects precisely the bills grouped under it
    #[test]
    fn prop_exact_day_matches_group(
        raw in prop::collection::vec(bill_strategy(), 1..30),
        calendar in calendars(),
    ) {
        let bills = build_bills(raw);
        let days = aggregate(&bills, &catalog(), &SummaryFilter::All, &calendar, now()).unwrap();
        for day in &days {
            let filter = SummaryFilter::ExactDate(day.day.clone());
            let selected = filter_bills(&bills, &filter, &calendar, now());
            prop_assert_eq!(ids(&selected), ids(&day.bills));
        }
    }

    /// Bill totals are additive over lines
    #[test]
    fn prop_calculator_additive(
        first in prop::collection::vec(line_strategy(), 0..6),
        second in prop::collection::vec(line_strategy(), 0..6),
    ) {
        let catalog = catalog();
        let items = index_items(&catalog);
        let resolve = |lines: &[(u128, Decimal, Decimal)]| {
            lines
                .iter()
                .map(|(item, quantity, rate)| (items.get(&Uuid::from_u128(*item)), *quantity, *rate))
                .collect::<Vec<_>>()
        };

        let a = calculate_bill(resolve(&first)).unwrap();
        let b = calculate_bill(resolve(&second)).unwrap();
        let mut joined = first.clone();
        joined.extend(second.iter().cloned());
        let both = calculate_bill(resolve(&joined)).unwrap();

        prop_assert_eq!(both.subtotal, a.subtotal + b.subtotal);
        prop_assert_eq!(both.gst_total, a.gst_total + b.gst_total);
        prop_assert_eq!(both.grand_total, both.subtotal + both.gst_total);
        prop_assert!(both.gst_total <= both.subtotal);
    }
}
