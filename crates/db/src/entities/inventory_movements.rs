//! `SeaORM` Entity for inventory_movements table.
//!
//! Append-only. Rows are never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{MovementKind, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub item_id: Uuid,
    pub lot_id: Uuid,
    pub movement_type: MovementKind,
    /// Signed, scale 3.
    pub qty: String,
    pub unit_cost: String,
    pub source_type: SourceKind,
    pub source_id: Uuid,
    pub actor_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::ItemId",
        to = "super::inventory_items::Column::Id"
    )]
    InventoryItems,
    #[sea_orm(
        belongs_to = "super::inventory_lots::Entity",
        from = "Column::LotId",
        to = "super::inventory_lots::Column::Id"
    )]
    InventoryLots,
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::inventory_lots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
