//! `SeaORM` Entity for accounting_journal_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LineSide;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_journal_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub journal_id: Uuid,
    pub company_id: Uuid,
    pub line_no: i32,
    pub account_id: Uuid,
    pub account_code: String,
    pub side: LineSide,
    /// Positive, scale 3.
    pub amount: String,
    pub lot_id: Option<Uuid>,
    pub movement_id: Option<Uuid>,
    pub memo: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounting_journals::Entity",
        from = "Column::JournalId",
        to = "super::accounting_journals::Column::Id"
    )]
    AccountingJournals,
    #[sea_orm(
        belongs_to = "super::chart_of_accounts::Entity",
        from = "Column::AccountId",
        to = "super::chart_of_accounts::Column::Id"
    )]
    ChartOfAccounts,
}

impl Related<super::accounting_journals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountingJournals.def()
    }
}

impl Related<super::chart_of_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChartOfAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
