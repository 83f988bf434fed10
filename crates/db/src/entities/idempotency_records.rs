//! `SeaORM` Entity for idempotency_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::IdempotencyState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "idempotency_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub actor_id: Uuid,
    pub idempotency_key: String,
    pub method: String,
    pub path: String,
    /// Hex SHA-256 of the canonical request.
    pub request_hash: String,
    pub state: IdempotencyState,
    pub response_status: Option<i32>,
    pub response_body: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
