//! On-hand projection and conservation checks.
//!
//! `on_hand` on an item is a cache of `Σ lot.remaining_qty`. It is only ever
//! overwritten with a fresh sum, never adjusted incrementally. The audit
//! functions here compare the cache and every lot against the movement
//! ledger without touching anything.

use larder_shared::types::{ItemId, LotId, Quantity};
use serde::{Deserialize, Serialize};

use super::types::{LotSnapshot, MovementType};

/// Cached vs. recomputed on-hand for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAudit {
    /// Item checked.
    pub item_id: ItemId,
    /// Value stored on the item.
    pub cached: Quantity,
    /// Sum of lot remaining quantities.
    pub truth: Quantity,
    /// `cached == truth`.
    pub matches: bool,
    /// Whether the cached value was overwritten during this audit.
    pub fixed: bool,
}

/// Conservation check for one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotAudit {
    /// Lot checked.
    pub lot_id: LotId,
    /// Item the lot belongs to.
    pub item_id: ItemId,
    /// Quantity the lot was opened with.
    pub received_qty: Quantity,
    /// `received_qty + Σ outbound movement qty`.
    pub expected_remaining: Quantity,
    /// Remaining quantity stored on the lot.
    pub actual_remaining: Quantity,
    /// Expected and actual agree, and the opening movement matches the receipt.
    pub matches: bool,
    /// Remaining is negative or exceeds the received quantity.
    pub invalid: bool,
}

/// Result of an audit run over one branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Per-item projection checks.
    pub items: Vec<ItemAudit>,
    /// Per-lot conservation checks.
    pub lots: Vec<LotAudit>,
}

impl AuditReport {
    /// Items whose cached on-hand disagreed with their lots.
    pub fn item_mismatches(&self) -> impl Iterator<Item = &ItemAudit> {
        self.items.iter().filter(|item| !item.matches)
    }

    /// Lots failing conservation or bounds.
    pub fn lot_mismatches(&self) -> impl Iterator<Item = &LotAudit> {
        self.lots.iter().filter(|lot| !lot.matches || lot.invalid)
    }

    /// True when every item and lot checks out.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.item_mismatches().next().is_none() && self.lot_mismatches().next().is_none()
    }
}

/// Projection rules - stateless, all methods are associated functions.
pub struct Projection;

impl Projection {
    /// Recomputes on-hand from lot remaining quantities.
    pub fn on_hand<I>(remaining: I) -> Quantity
    where
        I: IntoIterator<Item = Quantity>,
    {
        remaining.into_iter().sum()
    }

    /// Compares a cached on-hand value with the lots it should summarize.
    pub fn audit_item<I>(item_id: ItemId, cached: Quantity, remaining: I) -> ItemAudit
    where
        I: IntoIterator<Item = Quantity>,
    {
        let truth = Self::on_hand(remaining);
        ItemAudit {
            item_id,
            cached,
            truth,
            matches: cached == truth,
            fixed: false,
        }
    }

    /// Checks one lot against the movements that reference it.
    ///
    /// The lot-opening movement is compared with `received_qty`; every other
    /// movement is added to it to get the expected remaining quantity.
    pub fn audit_lot<I>(lot: &LotSnapshot, movements: I) -> LotAudit
    where
        I: IntoIterator<Item = (MovementType, Quantity)>,
    {
        let mut opened = Quantity::zero();
        let mut expected_remaining = lot.received_qty;
        for (kind, qty) in movements {
            if kind.is_inbound() {
                opened += qty;
            } else {
                expected_remaining += qty;
            }
        }

        let actual_remaining = lot.remaining_qty;
        LotAudit {
            lot_id: lot.id,
            item_id: lot.item_id,
            received_qty: lot.received_qty,
            expected_remaining,
            actual_remaining,
            matches: expected_remaining == actual_remaining && opened == lot.received_qty,
            invalid: actual_remaining.is_negative() || actual_remaining > lot.received_qty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use larder_shared::types::{BranchId, UnitCost};
    use rust_decimal_macros::dec;

    fn lot(received: Quantity, remaining: Quantity) -> LotSnapshot {
        LotSnapshot {
            id: LotId::new(),
            item_id: ItemId::new(),
            branch_id: BranchId::new(),
            lot_seq: 1,
            received_at: Utc::now(),
            expiry_date: None,
            received_qty: received,
            remaining_qty: remaining,
            unit_cost: UnitCost::new(dec!(2)),
            currency: "IDR".to_string(),
        }
    }

    #[test]
    fn test_on_hand_is_sum_of_remaining() {
        let total = Projection::on_hand([Quantity::new(dec!(1.5)), Quantity::new(dec!(0.25))]);
        assert_eq!(total, Quantity::new(dec!(1.75)));
        assert!(Projection::on_hand(Vec::new()).is_zero());
    }

    #[test]
    fn test_item_audit_flags_stale_cache() {
        let item = ItemId::new();
        let audit = Projection::audit_item(item, Quantity::new(dec!(10)), [Quantity::new(dec!(7))]);
        assert!(!audit.matches);
        assert_eq!(audit.truth, Quantity::new(dec!(7)));
        assert!(!audit.fixed);
    }

    #[test]
    fn test_lot_conservation_holds() {
        let lot = lot(Quantity::new(dec!(10)), Quantity::new(dec!(4)));
        let audit = Projection::audit_lot(
            &lot,
            [
                (MovementType::Receipt, Quantity::new(dec!(10))),
                (MovementType::Consumption, Quantity::new(dec!(-5))),
                (MovementType::AdjustmentOut, Quantity::new(dec!(-1))),
            ],
        );
        assert!(audit.matches);
        assert!(!audit.invalid);
        assert_eq!(audit.expected_remaining, Quantity::new(dec!(4)));
    }

    #[test]
    fn test_lot_conservation_detects_drift() {
        let lot = lot(Quantity::new(dec!(10)), Quantity::new(dec!(6)));
        let audit = Projection::audit_lot(
            &lot,
            [
                (MovementType::Receipt, Quantity::new(dec!(10))),
                (MovementType::Consumption, Quantity::new(dec!(-5))),
            ],
        );
        assert!(!audit.matches);
        assert_eq!(audit.expected_remaining, Quantity::new(dec!(5)));

        let report = AuditReport {
            items: vec![],
            lots: vec![audit],
        };
        assert!(!report.is_clean());
        assert_eq!(report.lot_mismatches().count(), 1);
    }

    #[test]
    fn test_lot_bounds() {
        let over = lot(Quantity::new(dec!(10)), Quantity::new(dec!(11)));
        assert!(Projection::audit_lot(&over, []).invalid);

        let negative = lot(Quantity::new(dec!(10)), Quantity::new(dec!(-1)));
        assert!(Projection::audit_lot(&negative, []).invalid);
    }
}
