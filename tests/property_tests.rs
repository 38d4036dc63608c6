//! Property-based tests for the mine-ops core.
//!
//! These tests use proptest to check the stock tiers, invoice arithmetic,
//! attendance upserts and list filtering over a wide range of inputs.

mod common;

use mine_ops::{
    common::round_money,
    errors::ServiceError,
    filter::ListFilter,
    models::{AttendanceStatus, Cart, CartStatus, StockStatus},
    services::{
        inventory::classify,
        invoicing::{calculate_totals, TAX_RATE},
    },
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// Strategies for generating test data
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000, 0u32..4).prop_map(|(units, scale)| Decimal::new(units, scale))
}

/// Any non-negative `Decimal`, up to `Decimal::MAX`.
fn full_range_strategy() -> impl Strategy<Value = Decimal> {
    (any::<u32>(), any::<u32>(), any::<u32>(), 0u32..=28)
        .prop_map(|(lo, mid, hi, scale)| Decimal::from_parts(lo, mid, hi, false, scale))
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn lines_strategy() -> impl Strategy<Value = Vec<(u32, Decimal)>> {
    prop::collection::vec((1u32..1_000, price_strategy()), 0..12)
}

fn status_strategy() -> impl Strategy<Value = AttendanceStatus> {
    prop_oneof![
        Just(AttendanceStatus::Present),
        Just(AttendanceStatus::Absent),
        Just(AttendanceStatus::Late),
        Just(AttendanceStatus::Excused),
    ]
}

fn cart_strategy() -> impl Strategy<Value = Cart> {
    (
        "CC-[0-9]{3}",
        "Sector [A-F]",
        prop_oneof![
            Just(CartStatus::Active),
            Just(CartStatus::Maintenance),
            Just(CartStatus::OutOfService),
        ],
    )
        .prop_map(|(code, location, status)| {
            Cart::new(code, Decimal::from(50), location).with_status(status)
        })
}

// Property: exactly one tier, chosen by the thresholds
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn classify_follows_thresholds(stock in amount_strategy(), minimum in amount_strategy()) {
        let tier = classify(stock, minimum);
        let expected = if stock <= minimum {
            StockStatus::LowStock
        } else if stock <= minimum * Decimal::new(15, 1) {
            StockStatus::MediumStock
        } else {
            StockStatus::NormalStock
        };
        prop_assert_eq!(tier, expected);
    }

    #[test]
    fn classify_is_total_over_full_range(stock in full_range_strategy(), minimum in full_range_strategy()) {
        let tier = classify(stock, minimum);
        prop_assert_eq!(tier == StockStatus::LowStock, stock <= minimum);
        if minimum.is_zero() {
            prop_assert_ne!(tier, StockStatus::MediumStock);
        }
    }

    #[test]
    fn zero_minimum_never_yields_medium(stock in amount_strategy()) {
        let tier = classify(stock, Decimal::ZERO);
        prop_assert_ne!(tier, StockStatus::MediumStock);
        prop_assert_eq!(tier == StockStatus::LowStock, stock.is_zero());
    }
}

// Property: invoice totals are consistent
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn totals_are_consistent(lines in lines_strategy()) {
        let totals = calculate_totals(lines.clone()).unwrap();

        let expected_subtotal: Decimal = lines
            .iter()
            .map(|(quantity, price)| Decimal::from(*quantity) * *price)
            .sum();
        prop_assert_eq!(totals.subtotal, expected_subtotal);
        prop_assert_eq!(totals.tax, round_money(expected_subtotal * TAX_RATE));
        prop_assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn totals_over_full_range_never_panic(
        lines in prop::collection::vec((any::<u32>(), full_range_strategy()), 0..6)
    ) {
        match calculate_totals(lines) {
            Ok(totals) => {
                prop_assert_eq!(totals.total, totals.subtotal + totals.tax);
                prop_assert!(totals.tax <= totals.subtotal);
            }
            Err(err) => prop_assert!(matches!(err, ServiceError::ValidationError(_))),
        }
    }

    #[test]
    fn stored_invoice_matches_calculator(lines in prop::collection::vec((1u32..1_000, price_strategy()), 1..8)) {
        let mut state = common::empty_state();
        let invoice = state
            .invoicing
            .create_invoice(common::invoice_draft("F-PROP", &lines))
            .unwrap();
        prop_assert_eq!(invoice.totals(), calculate_totals(lines).unwrap());
    }
}

// Property: marking attendance twice keeps a single mark with the last status
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn attendance_mark_is_idempotent(first in status_strategy(), second in status_strategy()) {
        let mut state = common::seeded_state();
        let day = common::sample_day().succ_opt().unwrap();

        state.workforce.mark_attendance("1", day, first).unwrap();
        state.workforce.mark_attendance("1", day, second).unwrap();

        let marks: Vec<_> = state
            .workforce
            .marks_for_date(day)
            .into_iter()
            .filter(|mark| mark.worker_id == "1")
            .collect();
        prop_assert_eq!(marks.len(), 1);
        prop_assert_eq!(marks[0].status, second);
    }
}

// Property: filtering is an order-preserving narrowing
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn filter_is_ordered_subsequence(
        carts in prop::collection::vec(cart_strategy(), 0..20),
        query in "[a-fA-F0-9 -]{0,4}",
        category in prop_oneof![Just(String::new()), Just("active".to_string()), Just("maintenance".to_string())],
    ) {
        let filtered = ListFilter::new(query, category).apply(&carts);

        let mut cursor = 0;
        for cart in &filtered {
            let offset = carts[cursor..]
                .iter()
                .position(|candidate| std::ptr::eq(candidate, *cart));
            prop_assert!(offset.is_some(), "filtered record out of order");
            cursor += offset.unwrap_or(0) + 1;
        }
    }

    #[test]
    fn empty_filter_keeps_everything(carts in prop::collection::vec(cart_strategy(), 0..20)) {
        let filtered = ListFilter::default().apply(&carts);
        prop_assert_eq!(filtered.len(), carts.len());
        for (kept, original) in filtered.iter().zip(carts.iter()) {
            prop_assert!(std::ptr::eq(*kept, original));
        }
    }
}
