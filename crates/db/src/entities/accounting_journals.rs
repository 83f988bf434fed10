//! `SeaORM` Entity for accounting_journals table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{JournalState, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_journals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub source_type: SourceKind,
    pub source_id: Uuid,
    pub status: JournalState,
    pub memo: String,
    pub total_debit: String,
    pub total_credit: String,
    /// Journal this one reverses.
    pub reversal_of: Option<Uuid>,
    pub void_reason: Option<String>,
    pub voided_at: Option<DateTimeWithTimeZone>,
    pub voided_by: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounting_journal_lines::Entity")]
    AccountingJournalLines,
}

impl Related<super::accounting_journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountingJournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
