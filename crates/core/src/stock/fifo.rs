//! FIFO lot allocation.
//!
//! Pure functions over lot snapshots. The repository layer locks the
//! candidate lots, hands them here, and writes back whatever this module
//! decides. Nothing is decided partially: either the full demand is
//! allocated or an error is returned and no lot is touched.

use std::cmp::Ordering;

use larder_shared::types::{BranchId, ItemId, LotId, Quantity};

use super::types::{Allocation, LotSnapshot, LotSelection, OrderingPolicy};
use crate::error::StockError;

/// FIFO allocator - stateless, all methods are associated functions.
pub struct FifoAllocator;

impl FifoAllocator {
    /// Compares two lots under `policy`.
    ///
    /// Receipt order: `received_at`, then `lot_seq`.
    /// Expiry first: `expiry_date` ascending with missing dates last, then
    /// receipt order.
    #[must_use]
    pub fn compare(policy: OrderingPolicy, a: &LotSnapshot, b: &LotSnapshot) -> Ordering {
        let receipt_order = || {
            a.received_at
                .cmp(&b.received_at)
                .then_with(|| a.lot_seq.cmp(&b.lot_seq))
        };

        match policy {
            OrderingPolicy::ReceiptOrder => receipt_order(),
            OrderingPolicy::ExpiryFirst => match (a.expiry_date, b.expiry_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(receipt_order),
        }
    }

    /// Sorts lots in consumption order.
    pub fn sort(policy: OrderingPolicy, lots: &mut [LotSnapshot]) {
        lots.sort_by(|a, b| Self::compare(policy, a, b));
    }

    /// Total quantity available across lots with stock left.
    #[must_use]
    pub fn available(lots: &[LotSnapshot]) -> Quantity {
        lots.iter()
            .filter(|lot| lot.remaining_qty.is_positive())
            .map(|lot| lot.remaining_qty)
            .sum()
    }

    /// Allocates `qty_needed` for one consumption line.
    ///
    /// `candidates` are the item's lots in the branch. For
    /// [`LotSelection::Preferred`] the pinned lot may be missing from the
    /// candidates (wrong item, exhausted); `preferred` carries whatever the
    /// caller could find for that ID in the branch.
    pub fn allocate(
        item_id: ItemId,
        branch_id: BranchId,
        candidates: &[LotSnapshot],
        selection: LotSelection,
        preferred: Option<&LotSnapshot>,
        qty_needed: Quantity,
    ) -> Result<Vec<Allocation>, StockError> {
        if !qty_needed.is_positive() {
            return Err(StockError::InvalidQuantity(format!(
                "consumption quantity must be positive, got {qty_needed}"
            )));
        }

        match selection {
            LotSelection::Ordered(policy) => {
                Self::allocate_ordered(item_id, candidates, policy, qty_needed)
            }
            LotSelection::Preferred(lot_id) => {
                Self::allocate_preferred(item_id, branch_id, lot_id, preferred, qty_needed)
            }
        }
    }

    /// Walks candidate lots in `policy` order, taking from each until the
    /// demand is met.
    pub fn allocate_ordered(
        item_id: ItemId,
        candidates: &[LotSnapshot],
        policy: OrderingPolicy,
        qty_needed: Quantity,
    ) -> Result<Vec<Allocation>, StockError> {
        let mut lots: Vec<&LotSnapshot> = candidates
            .iter()
            .filter(|lot| lot.item_id == item_id && lot.remaining_qty.is_positive())
            .collect();
        lots.sort_by(|a, b| Self::compare(policy, a, b));

        let available: Quantity = lots.iter().map(|lot| lot.remaining_qty).sum();
        if available < qty_needed {
            return Err(StockError::InsufficientStock {
                item_id,
                requested: qty_needed,
                available,
            });
        }

        let mut remaining_need = qty_needed;
        let mut allocations = Vec::new();
        for lot in lots {
            if remaining_need.is_zero() {
                break;
            }
            let take = remaining_need.min(lot.remaining_qty);
            remaining_need -= take;
            allocations.push(Allocation {
                lot_id: lot.id,
                qty_taken: take,
                unit_cost: lot.unit_cost,
                remaining_after: lot.remaining_qty - take,
            });
        }

        if !remaining_need.is_zero() {
            return Err(StockError::AllocationIncomplete {
                item_id,
                remaining: remaining_need,
            });
        }

        Ok(allocations)
    }

    /// Takes the whole demand from one named lot.
    pub fn allocate_preferred(
        item_id: ItemId,
        branch_id: BranchId,
        lot_id: LotId,
        lot: Option<&LotSnapshot>,
        qty_needed: Quantity,
    ) -> Result<Vec<Allocation>, StockError> {
        let invalid = |reason| StockError::PreferredLotInvalid { lot_id, reason };

        // A lot held by another branch is reported as missing.
        let lot = lot
            .filter(|lot| lot.id == lot_id && lot.branch_id == branch_id)
            .ok_or_else(|| invalid("lot not found"))?;
        if lot.item_id != item_id {
            return Err(invalid("lot belongs to another item"));
        }
        if !lot.remaining_qty.is_positive() {
            return Err(invalid("lot is exhausted"));
        }
        if lot.remaining_qty < qty_needed {
            return Err(StockError::InsufficientStock {
                item_id,
                requested: qty_needed,
                available: lot.remaining_qty,
            });
        }

        Ok(vec![Allocation {
            lot_id,
            qty_taken: qty_needed,
            unit_cost: lot.unit_cost,
            remaining_after: lot.remaining_qty - qty_needed,
        }])
    }

    /// Applies allocations to in-memory snapshots so a later line in the same
    /// call sees the depleted state.
    pub fn apply(lots: &mut [LotSnapshot], allocations: &[Allocation]) -> Result<(), StockError> {
        for allocation in allocations {
            let lot = lots
                .iter_mut()
                .find(|lot| lot.id == allocation.lot_id)
                .ok_or_else(|| {
                    StockError::Internal(format!(
                        "allocated lot {} is not among the locked lots",
                        allocation.lot_id
                    ))
                })?;
            let after = lot.remaining_qty - allocation.qty_taken;
            if after.is_negative() {
                return Err(StockError::Internal(format!(
                    "lot {} would go negative",
                    allocation.lot_id
                )));
            }
            lot.remaining_qty = after;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use larder_shared::types::UnitCost;
    use rust_decimal_macros::dec;

    fn lot(item_id: ItemId, branch_id: BranchId, seq: i64, day: i64, qty: Quantity) -> LotSnapshot {
        LotSnapshot {
            id: LotId::new(),
            item_id,
            branch_id,
            lot_seq: seq,
            received_at: Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap() + Duration::days(day - 1),
            expiry_date: None,
            received_qty: qty,
            remaining_qty: qty,
            unit_cost: UnitCost::new(dec!(1000)),
            currency: "IDR".to_string(),
        }
    }

    fn qty(value: rust_decimal::Decimal) -> Quantity {
        Quantity::new(value)
    }

    #[test]
    fn test_consumes_oldest_lot_first() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let day3 = lot(item, branch, 2, 3, qty(dec!(10)));
        let day1 = lot(item, branch, 1, 1, qty(dec!(10)));
        let lots = vec![day3.clone(), day1.clone()];

        let allocations =
            FifoAllocator::allocate_ordered(item, &lots, OrderingPolicy::ReceiptOrder, qty(dec!(15)))
                .unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].lot_id, day1.id);
        assert_eq!(allocations[0].qty_taken, qty(dec!(10)));
        assert!(allocations[0].remaining_after.is_zero());
        assert_eq!(allocations[1].lot_id, day3.id);
        assert_eq!(allocations[1].qty_taken, qty(dec!(5)));
        assert_eq!(allocations[1].remaining_after, qty(dec!(5)));
    }

    #[test]
    fn test_same_timestamp_breaks_tie_by_sequence() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let first = lot(item, branch, 1, 1, qty(dec!(1)));
        let second = lot(item, branch, 2, 1, qty(dec!(1)));
        let lots = vec![second.clone(), first.clone()];

        let allocations =
            FifoAllocator::allocate_ordered(item, &lots, OrderingPolicy::ReceiptOrder, qty(dec!(1)))
                .unwrap();
        assert_eq!(allocations[0].lot_id, first.id);
    }

    #[test]
    fn test_insufficient_stock_reports_available() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let lots = vec![lot(item, branch, 1, 1, qty(dec!(4.5)))];

        let err =
            FifoAllocator::allocate_ordered(item, &lots, OrderingPolicy::ReceiptOrder, qty(dec!(5)))
                .unwrap_err();
        match err {
            StockError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, qty(dec!(5)));
                assert_eq!(available, qty(dec!(4.5)));
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }
    }

    #[test]
    fn test_exhausted_lots_are_skipped() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let mut empty = lot(item, branch, 1, 1, qty(dec!(3)));
        empty.remaining_qty = Quantity::zero();
        let full = lot(item, branch, 2, 2, qty(dec!(3)));

        let allocations = FifoAllocator::allocate_ordered(
            item,
            &[empty, full.clone()],
            OrderingPolicy::ReceiptOrder,
            qty(dec!(2)),
        )
        .unwrap();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].lot_id, full.id);
    }

    #[test]
    fn test_expiry_first_puts_undated_lots_last() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let undated = lot(item, branch, 1, 1, qty(dec!(5)));
        let mut late = lot(item, branch, 2, 2, qty(dec!(5)));
        late.expiry_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let mut soon = lot(item, branch, 3, 3, qty(dec!(5)));
        soon.expiry_date = NaiveDate::from_ymd_opt(2026, 2, 1);

        let mut lots = vec![undated.clone(), late.clone(), soon.clone()];
        FifoAllocator::sort(OrderingPolicy::ExpiryFirst, &mut lots);
        let order: Vec<LotId> = lots.iter().map(|l| l.id).collect();
        assert_eq!(order, vec![soon.id, late.id, undated.id]);

        FifoAllocator::sort(OrderingPolicy::ReceiptOrder, &mut lots);
        let order: Vec<LotId> = lots.iter().map(|l| l.id).collect();
        assert_eq!(order, vec![undated.id, late.id, soon.id]);
    }

    #[test]
    fn test_rejects_non_positive_demand() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let err = FifoAllocator::allocate(
            item,
            branch,
            &[],
            LotSelection::default(),
            None,
            Quantity::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity(_)));
    }

    #[test]
    fn test_preferred_lot_validation() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let good = lot(item, branch, 1, 1, qty(dec!(5)));

        let allocations = FifoAllocator::allocate_preferred(
            item,
            branch,
            good.id,
            Some(&good),
            qty(dec!(2)),
        )
        .unwrap();
        assert_eq!(allocations[0].remaining_after, qty(dec!(3)));

        let other_branch = lot(item, BranchId::new(), 2, 1, qty(dec!(5)));
        let err = FifoAllocator::allocate_preferred(
            item,
            branch,
            other_branch.id,
            Some(&other_branch),
            qty(dec!(1)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StockError::PreferredLotInvalid {
                reason: "lot not found",
                ..
            }
        ));

        let mut exhausted = lot(item, branch, 3, 1, qty(dec!(5)));
        exhausted.remaining_qty = Quantity::zero();
        let err = FifoAllocator::allocate_preferred(
            item,
            branch,
            exhausted.id,
            Some(&exhausted),
            qty(dec!(1)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StockError::PreferredLotInvalid {
                reason: "lot is exhausted",
                ..
            }
        ));

        let err =
            FifoAllocator::allocate_preferred(item, branch, LotId::new(), None, qty(dec!(1)))
                .unwrap_err();
        assert!(matches!(err, StockError::PreferredLotInvalid { .. }));
    }

    #[test]
    fn test_apply_depletes_snapshots() {
        let item = ItemId::new();
        let branch = BranchId::new();
        let mut lots = vec![lot(item, branch, 1, 1, qty(dec!(10)))];
        let first =
            FifoAllocator::allocate_ordered(item, &lots, OrderingPolicy::ReceiptOrder, qty(dec!(7)))
                .unwrap();
        FifoAllocator::apply(&mut lots, &first).unwrap();
        assert_eq!(FifoAllocator::available(&lots), qty(dec!(3)));

        let err =
            FifoAllocator::allocate_ordered(item, &lots, OrderingPolicy::ReceiptOrder, qty(dec!(4)))
                .unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { .. }));
    }
}
