//! Journal derivation from posted movements.
//!
//! Each movement contributes `|qty| x unit_cost`, truncated to scale 3:
//!
//! | movement        | debit (per lot)       | credit                         |
//! |-----------------|-----------------------|--------------------------------|
//! | receipt         | 1300 Inventory        | 2100 Accounts Payable (one line) |
//! | adjustment in   | 1300 Inventory        | 5200 Inventory Adjustment (one line) |
//! | consumption     | 5100 COGS             | 1300 Inventory (per lot)       |
//! | adjustment out  | 5200 Inventory Adj.   | 1300 Inventory (per lot)       |
//!
//! Zero-value movements produce no lines.

use larder_shared::types::Amount;

use super::types::{
    AccountCode, EntrySide, JournalDraft, JournalLineDraft, JournalTotals, PostedMovement,
};
use crate::error::StockError;
use crate::posting::SourceRef;
use crate::stock::MovementType;

/// Journal builder - stateless, all methods are associated functions.
pub struct JournalBuilder;

impl JournalBuilder {
    /// Derives a balanced journal for the movements of one source document.
    pub fn derive(
        source: &SourceRef,
        movements: &[PostedMovement],
    ) -> Result<JournalDraft, StockError> {
        let mut lines = Vec::with_capacity(movements.len() * 2);
        // Aggregated credit lines, in first-seen order.
        let mut aggregated: Vec<(AccountCode, Amount)> = Vec::new();

        for movement in movements {
            let amount = movement.qty.abs().extend(movement.unit_cost)?;
            if amount.is_zero() {
                continue;
            }

            let per_lot = |account: AccountCode, side: EntrySide| JournalLineDraft {
                account,
                side,
                amount,
                lot_id: Some(movement.lot_id),
                movement_id: Some(movement.movement_id),
                memo: format!(
                    "{} {} x {} lot {}",
                    movement.movement_type,
                    movement.qty.abs(),
                    movement.unit_cost,
                    movement.lot_id
                ),
            };

            match movement.movement_type {
                MovementType::Receipt => {
                    lines.push(per_lot(AccountCode::Inventory, EntrySide::Debit));
                    accumulate(&mut aggregated, AccountCode::AccountsPayable, amount);
                }
                MovementType::AdjustmentIn => {
                    lines.push(per_lot(AccountCode::Inventory, EntrySide::Debit));
                    accumulate(&mut aggregated, AccountCode::InventoryAdjustment, amount);
                }
                MovementType::Consumption => {
                    lines.push(per_lot(AccountCode::CostOfGoodsSold, EntrySide::Debit));
                    lines.push(per_lot(AccountCode::Inventory, EntrySide::Credit));
                }
                MovementType::AdjustmentOut => {
                    lines.push(per_lot(AccountCode::InventoryAdjustment, EntrySide::Debit));
                    lines.push(per_lot(AccountCode::Inventory, EntrySide::Credit));
                }
            }
        }

        lines.extend(
            aggregated
                .into_iter()
                .map(|(account, amount)| JournalLineDraft {
                    account,
                    side: EntrySide::Credit,
                    amount,
                    lot_id: None,
                    movement_id: None,
                    memo: format!("{} total for {source}", account.default_name()),
                }),
        );

        Self::finalize(*source, format!("Inventory journal for {source}"), lines)
    }

    /// Checks balance and value, then wraps the lines into a draft.
    pub fn finalize(
        source: SourceRef,
        memo: String,
        lines: Vec<JournalLineDraft>,
    ) -> Result<JournalDraft, StockError> {
        let totals = JournalTotals::of(&lines);
        if !totals.is_balanced() {
            return Err(StockError::UnbalancedJournal {
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        if !totals.debit.is_positive() {
            return Err(StockError::NonPostable {
                total: totals.debit,
            });
        }

        Ok(JournalDraft {
            source,
            memo,
            lines,
            totals,
        })
    }
}

fn accumulate(aggregated: &mut Vec<(AccountCode, Amount)>, account: AccountCode, amount: Amount) {
    match aggregated.iter_mut().find(|(code, _)| *code == account) {
        Some((_, total)) => *total += amount,
        None => aggregated.push((account, amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::SourceType;
    use larder_shared::types::{ItemId, LotId, MovementId, Quantity, UnitCost};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn movement(kind: MovementType, qty: Quantity, cost: UnitCost) -> PostedMovement {
        PostedMovement {
            movement_id: MovementId::new(),
            lot_id: LotId::new(),
            item_id: ItemId::new(),
            movement_type: kind,
            qty: kind.signed(qty),
            unit_cost: cost,
        }
    }

    fn source(source_type: SourceType) -> SourceRef {
        SourceRef::new(source_type, Uuid::new_v4())
    }

    #[test]
    fn test_receipt_debits_each_lot_and_credits_payables_once() {
        let movements = vec![
            movement(
                MovementType::Receipt,
                Quantity::new(dec!(2.5)),
                UnitCost::new(dec!(1000)),
            ),
            movement(
                MovementType::Receipt,
                Quantity::new(dec!(1)),
                UnitCost::new(dec!(300)),
            ),
        ];

        let draft = JournalBuilder::derive(&source(SourceType::GoodsReceipt), &movements).unwrap();

        assert_eq!(draft.lines.len(), 3);
        let debits: Vec<_> = draft
            .lines
            .iter()
            .filter(|l| l.side == EntrySide::Debit)
            .collect();
        assert_eq!(debits.len(), 2);
        assert!(debits.iter().all(|l| l.account == AccountCode::Inventory));
        assert_eq!(debits[0].amount.to_string(), "2500.000");
        assert_eq!(debits[0].lot_id, Some(movements[0].lot_id));

        let credit = draft.lines.last().unwrap();
        assert_eq!(credit.account, AccountCode::AccountsPayable);
        assert_eq!(credit.side, EntrySide::Credit);
        assert_eq!(credit.amount.to_string(), "2800.000");
        assert!(credit.lot_id.is_none());
        assert!(draft.totals.is_balanced());
    }

    #[test]
    fn test_consumption_moves_cost_per_lot() {
        let movements = vec![
            movement(
                MovementType::Consumption,
                Quantity::new(dec!(10)),
                UnitCost::new(dec!(1.5)),
            ),
            movement(
                MovementType::Consumption,
                Quantity::new(dec!(5)),
                UnitCost::new(dec!(2)),
            ),
        ];

        let draft =
            JournalBuilder::derive(&source(SourceType::KitchenConsumption), &movements).unwrap();

        assert_eq!(draft.lines.len(), 4);
        assert_eq!(draft.lines[0].account, AccountCode::CostOfGoodsSold);
        assert_eq!(draft.lines[1].account, AccountCode::Inventory);
        assert_eq!(draft.lines[1].side, EntrySide::Credit);
        assert_eq!(draft.lines[0].amount, draft.lines[1].amount);
        assert_eq!(draft.totals.debit, Amount::new(dec!(25)));
    }

    #[test]
    fn test_adjustments_use_adjustment_account() {
        let out = vec![movement(
            MovementType::AdjustmentOut,
            Quantity::new(dec!(1)),
            UnitCost::new(dec!(7)),
        )];
        let draft = JournalBuilder::derive(&source(SourceType::StockAdjustment), &out).unwrap();
        assert_eq!(draft.lines[0].account, AccountCode::InventoryAdjustment);
        assert_eq!(draft.lines[0].side, EntrySide::Debit);

        let inbound = vec![movement(
            MovementType::AdjustmentIn,
            Quantity::new(dec!(1)),
            UnitCost::new(dec!(7)),
        )];
        let draft = JournalBuilder::derive(&source(SourceType::StockAdjustment), &inbound).unwrap();
        assert_eq!(draft.lines[1].account, AccountCode::InventoryAdjustment);
        assert_eq!(draft.lines[1].side, EntrySide::Credit);
    }

    #[test]
    fn test_zero_value_is_not_postable() {
        let movements = vec![movement(
            MovementType::Receipt,
            Quantity::new(dec!(3)),
            UnitCost::zero(),
        )];
        let err =
            JournalBuilder::derive(&source(SourceType::GoodsReceipt), &movements).unwrap_err();
        assert!(matches!(err, StockError::NonPostable { .. }));

        let err = JournalBuilder::derive(&source(SourceType::GoodsReceipt), &[]).unwrap_err();
        assert_eq!(err.error_code(), "NON_POSTABLE");
    }

    #[test]
    fn test_zero_value_lines_are_skipped() {
        let movements = vec![
            movement(
                MovementType::Receipt,
                Quantity::new(dec!(0.001)),
                UnitCost::new(dec!(0.1)),
            ),
            movement(
                MovementType::Receipt,
                Quantity::new(dec!(1)),
                UnitCost::new(dec!(5)),
            ),
        ];
        let draft = JournalBuilder::derive(&source(SourceType::GoodsReceipt), &movements).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].lot_id, Some(movements[1].lot_id));
    }

    #[test]
    fn test_finalize_rejects_unbalanced_lines() {
        let lines = vec![JournalLineDraft {
            account: AccountCode::Inventory,
            side: EntrySide::Debit,
            amount: Amount::new(dec!(1)),
            lot_id: None,
            movement_id: None,
            memo: String::new(),
        }];
        let err = JournalBuilder::finalize(source(SourceType::GoodsReceipt), String::new(), lines)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
