//! Property-based tests for FIFO allocation.
//!
//! - Property 1: Conservation (allocated == requested, nothing over-drawn)
//! - Property 2: No oversell
//! - Property 3: Order determinism

use chrono::{Duration, TimeZone, Utc};
use larder_shared::types::{BranchId, ItemId, LotId, Quantity, UnitCost};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::fifo::FifoAllocator;
use super::types::{LotSnapshot, OrderingPolicy};
use crate::error::StockError;

/// Strategy to generate lot quantities (0.001 to 100.000).
fn lot_qty() -> impl Strategy<Value = Quantity> {
    (1i64..100_000i64).prop_map(|m| Quantity::new(Decimal::new(m, 3)))
}

/// Strategy to generate a demand (0.001 to 500.000).
fn demand() -> impl Strategy<Value = Quantity> {
    (1i64..500_000i64).prop_map(|m| Quantity::new(Decimal::new(m, 3)))
}

/// Strategy for a share of the available stock (0.1% to 100%).
fn share() -> impl Strategy<Value = Decimal> {
    (1i64..=1000i64).prop_map(|per_mille| Decimal::new(per_mille, 3))
}

/// Strategy for the ordering policy.
fn policy() -> impl Strategy<Value = OrderingPolicy> {
    prop_oneof![
        Just(OrderingPolicy::ReceiptOrder),
        Just(OrderingPolicy::ExpiryFirst)
    ]
}

/// Strategy for a set of lots of one item: (qty, day offset, expiry offset).
fn lots() -> impl Strategy<Value = Vec<(Quantity, i64, Option<i64>)>> {
    prop::collection::vec((lot_qty(), 0i64..30, prop::option::of(0i64..60)), 1..8)
}

fn build(item_id: ItemId, branch_id: BranchId, specs: &[(Quantity, i64, Option<i64>)]) -> Vec<LotSnapshot> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    specs
        .iter()
        .enumerate()
        .map(|(i, (qty, day, expiry))| LotSnapshot {
            id: LotId::new(),
            item_id,
            branch_id,
            lot_seq: i64::try_from(i).unwrap() + 1,
            received_at: base + Duration::days(*day),
            expiry_date: expiry.map(|d| (base + Duration::days(d)).date_naive()),
            received_qty: *qty,
            remaining_qty: *qty,
            unit_cost: UnitCost::new(Decimal::new(1500, 2)),
            currency: "IDR".to_string(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: a successful allocation takes exactly the demand and never
    /// more than a lot holds.
    #[test]
    fn prop_allocation_conserves_quantity(
        specs in lots(),
        fraction in share(),
        policy in policy(),
    ) {
        let item = ItemId::new();
        let lots = build(item, BranchId::new(), &specs);
        let need = Quantity::new(FifoAllocator::available(&lots).as_decimal() * fraction);
        prop_assume!(need.is_positive());

        let allocations = FifoAllocator::allocate_ordered(item, &lots, policy, need).unwrap();

        let taken: Quantity = allocations.iter().map(|a| a.qty_taken).sum();
        prop_assert_eq!(taken, need);
        for allocation in &allocations {
            let lot = lots.iter().find(|l| l.id == allocation.lot_id).unwrap();
            prop_assert!(allocation.qty_taken.is_positive());
            prop_assert!(allocation.qty_taken <= lot.remaining_qty);
            prop_assert_eq!(allocation.remaining_after, lot.remaining_qty - allocation.qty_taken);
        }
    }

    /// Property 2: demand above availability always fails with the exact
    /// availability, never a partial allocation.
    #[test]
    fn prop_no_oversell(specs in lots(), extra in demand(), policy in policy()) {
        let item = ItemId::new();
        let lots = build(item, BranchId::new(), &specs);
        let available = FifoAllocator::available(&lots);
        let need = available + extra;

        let result = FifoAllocator::allocate_ordered(item, &lots, policy, need);
        match result {
            Err(StockError::InsufficientStock { requested, available: reported, .. }) => {
                prop_assert_eq!(requested, need);
                prop_assert_eq!(reported, available);
            }
            other => prop_assert!(false, "expected insufficient stock, got {:?}", other),
        }
    }

    /// Property 3: only the last lot touched may be left partially consumed,
    /// and lots are visited in policy order.
    #[test]
    fn prop_allocation_follows_policy_order(
        specs in lots(),
        fraction in share(),
        policy in policy(),
    ) {
        let item = ItemId::new();
        let lots = build(item, BranchId::new(), &specs);
        let need = Quantity::new(FifoAllocator::available(&lots).as_decimal() * fraction);
        prop_assume!(need.is_positive());

        let allocations = FifoAllocator::allocate_ordered(item, &lots, policy, need).unwrap();

        let mut sorted = lots.clone();
        FifoAllocator::sort(policy, &mut sorted);
        for (allocation, lot) in allocations.iter().zip(sorted.iter()) {
            prop_assert_eq!(allocation.lot_id, lot.id);
        }
        for allocation in allocations.iter().rev().skip(1) {
            prop_assert!(allocation.remaining_after.is_zero());
        }
    }
}
