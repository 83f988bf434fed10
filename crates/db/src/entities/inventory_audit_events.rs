//! `SeaORM` Entity for inventory_audit_events table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_audit_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub actor_id: Uuid,
    /// Set when the audit was limited to one item.
    pub item_id: Option<Uuid>,
    pub items_checked: i32,
    pub item_mismatches: i32,
    pub lot_mismatches: i32,
    pub fix_applied: bool,
    /// Before/after values of every mismatched item and lot.
    pub detail: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
