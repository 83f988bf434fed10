//! String-backed enums shared by several tables.
//!
//! Each converts to and from its `larder_core` counterpart.

use larder_core::journal::{EntrySide, JournalStatus};
use larder_core::posting::{DocumentStatus, SourceType};
use larder_core::stock::MovementType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `stock_documents.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DocumentState {
    /// Being prepared.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Ready to post.
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    /// Posted.
    #[sea_orm(string_value = "POSTED")]
    Posted,
    /// Posted with quantity differences.
    #[sea_orm(string_value = "DISCREPANCY")]
    Discrepancy,
}

/// `source_type` columns on documents, lots, movements and journals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SourceKind {
    /// Goods receipt.
    #[sea_orm(string_value = "GOODS_RECEIPT")]
    GoodsReceipt,
    /// Kitchen consumption batch.
    #[sea_orm(string_value = "KITCHEN_CONSUMPTION")]
    KitchenConsumption,
    /// Stock adjustment.
    #[sea_orm(string_value = "STOCK_ADJUSTMENT")]
    StockAdjustment,
    /// Journal reversal.
    #[sea_orm(string_value = "JOURNAL_REVERSAL")]
    JournalReversal,
}

/// `inventory_movements.movement_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MovementKind {
    /// Goods receipt opening a lot.
    #[sea_orm(string_value = "RECEIPT")]
    Receipt,
    /// Kitchen consumption.
    #[sea_orm(string_value = "CONSUMPTION")]
    Consumption,
    /// Adjustment opening a lot.
    #[sea_orm(string_value = "ADJUSTMENT_IN")]
    AdjustmentIn,
    /// Adjustment depleting lots.
    #[sea_orm(string_value = "ADJUSTMENT_OUT")]
    AdjustmentOut,
}

/// `accounting_journals.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum JournalState {
    /// Live.
    #[sea_orm(string_value = "POSTED")]
    Posted,
    /// Reversed.
    #[sea_orm(string_value = "VOIDED")]
    Voided,
}

/// `accounting_journal_lines.side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum LineSide {
    /// Debit.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

/// `idempotency_records.state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum IdempotencyState {
    /// Reserved, operation running.
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    /// Response stored.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

macro_rules! mirror_enum {
    ($db:ident <=> $core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(DocumentState <=> DocumentStatus { Draft, Submitted, Posted, Discrepancy });
mirror_enum!(SourceKind <=> SourceType {
    GoodsReceipt,
    KitchenConsumption,
    StockAdjustment,
    JournalReversal,
});
mirror_enum!(MovementKind <=> MovementType {
    Receipt,
    Consumption,
    AdjustmentIn,
    AdjustmentOut,
});
mirror_enum!(JournalState <=> JournalStatus { Posted, Voided });
mirror_enum!(LineSide <=> EntrySide { Debit, Credit });

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveEnum, Iterable};

    #[test]
    fn test_stored_values_match_core_names() {
        for kind in MovementKind::iter() {
            let core: MovementType = kind.into();
            assert_eq!(kind.to_value(), core.as_str());
        }
        for kind in SourceKind::iter() {
            let core: SourceType = kind.into();
            assert_eq!(kind.to_value(), core.as_str());
        }
        for state in DocumentState::iter() {
            let core: DocumentStatus = state.into();
            assert_eq!(state.to_value(), core.as_str());
        }
        for side in LineSide::iter() {
            let core: EntrySide = side.into();
            assert_eq!(side.to_value(), core.as_str());
        }
    }
}
