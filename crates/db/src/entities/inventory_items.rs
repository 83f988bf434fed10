//! `SeaORM` Entity for inventory_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub unit: String,
    /// Cached `Σ lot.remaining_qty`, scale 3.
    pub on_hand: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_lots::Entity")]
    InventoryLots,
    #[sea_orm(has_many = "super::inventory_movements::Entity")]
    InventoryMovements,
}

impl Related<super::inventory_lots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLots.def()
    }
}

impl Related<super::inventory_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
