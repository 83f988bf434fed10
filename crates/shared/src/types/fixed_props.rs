//! Property-based tests for fixed-point truncation and arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::fixed::{self, Amount, Quantity, UnitCost};

/// Strategy for quantities from -1,000,000.000 to 1,000,000.000.
fn any_quantity() -> impl Strategy<Value = Quantity> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|m| Quantity::new(Decimal::new(m, 3)))
}

/// Strategy for unit costs from 0.000000 to 10,000,000.000000.
fn any_unit_cost() -> impl Strategy<Value = UnitCost> {
    (0i64..10_000_000_000_000i64).prop_map(|m| UnitCost::new(Decimal::new(m, 6)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Truncated extension
    // =========================================================================

    /// The extended amount never exceeds the exact product in magnitude and
    /// is less than one scale-3 step away from it.
    #[test]
    fn prop_extend_truncates(qty in any_quantity(), cost in any_unit_cost()) {
        let exact = qty.as_decimal() * cost.as_decimal();
        let amount = qty.extend(cost).unwrap().as_decimal();

        prop_assert!(amount.abs() <= exact.abs());
        prop_assert!((exact - amount).abs() < Decimal::new(1, 3));
        prop_assert_eq!(amount.scale(), 3);
    }

    /// Extension is sign-symmetric: truncation is toward zero.
    #[test]
    fn prop_extend_sign_symmetric(qty in any_quantity(), cost in any_unit_cost()) {
        let pos = qty.extend(cost).unwrap();
        let neg = (-qty).extend(cost).unwrap();
        prop_assert_eq!(pos, -neg);
    }

    // =========================================================================
    // Property 2: Canonical form
    // =========================================================================

    /// Display output always carries exactly three fractional digits and
    /// round-trips through the strict parser.
    #[test]
    fn prop_quantity_display_canonical(qty in any_quantity()) {
        let text = qty.to_string();
        let fraction = text.split('.').nth(1).unwrap_or_default();
        prop_assert_eq!(fraction.len(), 3);
        prop_assert_ne!(text.as_str(), "-0.000");
        prop_assert_eq!(text.parse::<Quantity>().unwrap(), qty);
    }

    /// String addition agrees with typed addition.
    #[test]
    fn prop_string_add_matches_typed(a in any_quantity(), b in any_quantity()) {
        let via_strings = fixed::add(&a.to_string(), &b.to_string(), 3).unwrap();
        prop_assert_eq!(via_strings, (a + b).to_string());
    }

    /// Summing amounts is order independent.
    #[test]
    fn prop_amount_sum_commutes(values in prop::collection::vec(any_quantity(), 0..20)) {
        let amounts: Vec<Amount> = values.iter().map(|q| Amount::new(q.as_decimal())).collect();
        let forward: Amount = amounts.iter().sum();
        let backward: Amount = amounts.iter().rev().sum();
        prop_assert_eq!(forward, backward);
    }
}
