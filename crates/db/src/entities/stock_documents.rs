//! `SeaORM` Entity for stock_documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DocumentState, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Uuid,
    pub source_type: SourceKind,
    pub source_id: Uuid,
    pub status: DocumentState,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub submitted_by: Option<Uuid>,
    pub posted_at: Option<DateTimeWithTimeZone>,
    pub posted_by: Option<Uuid>,
    pub projections: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
