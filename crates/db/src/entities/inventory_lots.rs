//! `SeaORM` Entity for inventory_lots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SourceKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub item_id: Uuid,
    /// Per-item creation order.
    pub lot_seq: i64,
    pub source_type: SourceKind,
    pub source_id: Uuid,
    pub source_line_id: Option<Uuid>,
    pub received_at: DateTimeWithTimeZone,
    pub expiry_date: Option<Date>,
    pub received_qty: String,
    pub remaining_qty: String,
    pub unit_cost: String,
    pub currency: String,
    /// Set once `remaining_qty` reaches zero; candidate queries skip these.
    pub depleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::ItemId",
        to = "super::inventory_items::Column::Id"
    )]
    InventoryItems,
    #[sea_orm(has_many = "super::inventory_movements::Entity")]
    InventoryMovements,
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::inventory_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
