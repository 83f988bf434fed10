//! Reversing journals for voided postings.
//!
//! A posted journal is never edited. Voiding writes a second journal with
//! every line's side swapped, pointing back at the original through a
//! `JOURNAL_REVERSAL` source reference.

use larder_shared::types::JournalId;

use super::builder::JournalBuilder;
use super::types::{JournalDraft, JournalLineDraft, JournalStatus, JournalTotals};
use crate::error::StockError;
use crate::posting::{SourceRef, SourceType};

/// Stateless service for creating reversing journals.
pub struct ReversalService;

impl ReversalService {
    /// Source reference of the reversal for `original`.
    #[must_use]
    pub fn reversal_source(original: JournalId) -> SourceRef {
        SourceRef::new(SourceType::JournalReversal, original.into_inner())
    }

    /// Checks that a journal may be voided.
    pub fn ensure_voidable(
        journal_id: JournalId,
        status: JournalStatus,
        is_reversal: bool,
    ) -> Result<(), StockError> {
        let invalid = |expected: &str| StockError::InvalidState {
            subject: format!("Journal {journal_id}"),
            status: status.to_string(),
            expected: expected.to_string(),
        };

        if status != JournalStatus::Posted {
            return Err(invalid("POSTED"));
        }
        if is_reversal {
            return Err(invalid("a non-reversal journal"));
        }
        Ok(())
    }

    /// Builds the reversing journal by swapping debits and credits.
    ///
    /// For each original line:
    /// - Debits become credits
    /// - Credits become debits
    /// - Account, amount, and lot/movement trace are preserved
    /// - Memo is prefixed with "Reversal: "
    pub fn reverse(
        original_id: JournalId,
        original_lines: &[JournalLineDraft],
        reason: &str,
    ) -> Result<JournalDraft, StockError> {
        if !Self::validate_reversal(original_lines) {
            let totals = JournalTotals::of(original_lines);
            return Err(StockError::UnbalancedJournal {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        let lines = original_lines
            .iter()
            .map(|line| JournalLineDraft {
                side: line.side.opposite(),
                memo: format!("Reversal: {}", line.memo),
                ..line.clone()
            })
            .collect();

        JournalBuilder::finalize(
            Self::reversal_source(original_id),
            format!("Reversal of journal {original_id}. Reason: {reason}"),
            lines,
        )
    }

    /// Original lines must balance for the reversal to balance.
    #[must_use]
    pub fn validate_reversal(original_lines: &[JournalLineDraft]) -> bool {
        JournalTotals::of(original_lines).is_balanced()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::types::{AccountCode, EntrySide};
    use larder_shared::types::{Amount, LotId};
    use rust_decimal_macros::dec;

    fn line(account: AccountCode, side: EntrySide, amount: Amount) -> JournalLineDraft {
        JournalLineDraft {
            account,
            side,
            amount,
            lot_id: Some(LotId::new()),
            movement_id: None,
            memo: "Receipt lot".to_string(),
        }
    }

    fn balanced() -> Vec<JournalLineDraft> {
        let amount = Amount::new(dec!(2500));
        vec![
            line(AccountCode::Inventory, EntrySide::Debit, amount),
            line(AccountCode::AccountsPayable, EntrySide::Credit, amount),
        ]
    }

    #[test]
    fn test_reverse_swaps_sides() {
        let original = balanced();
        let journal_id = JournalId::new();
        let draft = ReversalService::reverse(journal_id, &original, "duplicate receipt").unwrap();

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].side, EntrySide::Credit);
        assert_eq!(draft.lines[0].account, AccountCode::Inventory);
        assert_eq!(draft.lines[0].lot_id, original[0].lot_id);
        assert_eq!(draft.lines[1].side, EntrySide::Debit);
        assert!(draft.lines[0].memo.starts_with("Reversal: "));
        assert!(draft.totals.is_balanced());
        assert_eq!(draft.source.source_type, SourceType::JournalReversal);
        assert_eq!(draft.source.source_id, journal_id.into_inner());
        assert!(draft.memo.contains("duplicate receipt"));
    }

    #[test]
    fn test_reverse_rejects_unbalanced_original() {
        let mut original = balanced();
        original.pop();
        let err = ReversalService::reverse(JournalId::new(), &original, "x").unwrap_err();
        assert!(matches!(err, StockError::UnbalancedJournal { .. }));
    }

    #[test]
    fn test_only_posted_originals_are_voidable() {
        let id = JournalId::new();
        assert!(ReversalService::ensure_voidable(id, JournalStatus::Posted, false).is_ok());

        let err = ReversalService::ensure_voidable(id, JournalStatus::Voided, false).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");

        assert!(ReversalService::ensure_voidable(id, JournalStatus::Posted, true).is_err());
    }
}
