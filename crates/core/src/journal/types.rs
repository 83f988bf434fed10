//! Accounting journal domain types.

use std::fmt;
use std::str::FromStr;

use larder_shared::types::{Amount, ItemId, LotId, MovementId, Quantity, UnitCost};
use serde::{Deserialize, Serialize};

use crate::posting::SourceRef;
use crate::stock::{Movement, MovementType};

/// Side of a journal line.
///
/// Debits increase the inventory and expense accounts used here; credits
/// increase payables and decrease inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl EntrySide {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

/// Journal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalStatus {
    /// Live journal.
    Posted,
    /// Cancelled by a reversal journal. The row itself is never edited otherwise.
    Voided,
}

impl JournalStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posted => "POSTED",
            Self::Voided => "VOIDED",
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed accounts the inventory ledger posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountCode {
    /// 1300 Inventory (asset).
    Inventory,
    /// 2100 Accounts Payable (liability).
    AccountsPayable,
    /// 5100 Cost of Goods Sold (expense).
    CostOfGoodsSold,
    /// 5200 Inventory Adjustment (expense).
    InventoryAdjustment,
}

impl AccountCode {
    /// Every code a company must have configured.
    pub const ALL: [Self; 4] = [
        Self::Inventory,
        Self::AccountsPayable,
        Self::CostOfGoodsSold,
        Self::InventoryAdjustment,
    ];

    /// Chart of accounts code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Inventory => "1300",
            Self::AccountsPayable => "2100",
            Self::CostOfGoodsSold => "5100",
            Self::InventoryAdjustment => "5200",
        }
    }

    /// Default account name used when seeding a chart of accounts.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Inventory => "Inventory",
            Self::AccountsPayable => "Accounts Payable",
            Self::CostOfGoodsSold => "Cost of Goods Sold",
            Self::InventoryAdjustment => "Inventory Adjustment",
        }
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AccountCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == s)
            .ok_or_else(|| format!("Unknown account code: {s}"))
    }
}

/// A movement as seen by journal derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMovement {
    /// Movement ID.
    pub movement_id: MovementId,
    /// Lot affected.
    pub lot_id: LotId,
    /// Item affected.
    pub item_id: ItemId,
    /// Movement classification.
    pub movement_type: MovementType,
    /// Signed quantity.
    pub qty: Quantity,
    /// Unit cost of the lot.
    pub unit_cost: UnitCost,
}

impl From<&Movement> for PostedMovement {
    fn from(movement: &Movement) -> Self {
        Self {
            movement_id: movement.id,
            lot_id: movement.lot_id,
            item_id: movement.item_id,
            movement_type: movement.movement_type,
            qty: movement.qty,
            unit_cost: movement.unit_cost,
        }
    }
}

/// A journal line before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineDraft {
    /// Account posted to.
    pub account: AccountCode,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount at scale 3.
    pub amount: Amount,
    /// Lot that produced the line, when per-lot.
    pub lot_id: Option<LotId>,
    /// Movement that produced the line, when per-lot.
    pub movement_id: Option<MovementId>,
    /// Line memo.
    pub memo: String,
}

/// Debit and credit totals of a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debit lines.
    pub debit: Amount,
    /// Sum of credit lines.
    pub credit: Amount,
}

impl JournalTotals {
    /// Totals over a set of lines.
    #[must_use]
    pub fn of(lines: &[JournalLineDraft]) -> Self {
        let sum = |side: EntrySide| -> Amount {
            lines
                .iter()
                .filter(|line| line.side == side)
                .map(|line| line.amount)
                .sum()
        };
        Self {
            debit: sum(EntrySide::Debit),
            credit: sum(EntrySide::Credit),
        }
    }

    /// Debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

/// A derived journal ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDraft {
    /// Source document the journal is for.
    pub source: SourceRef,
    /// Header memo.
    pub memo: String,
    /// Lines in posting order.
    pub lines: Vec<JournalLineDraft>,
    /// Balanced totals.
    pub totals: JournalTotals,
}
