//! Row-to-domain conversions shared by the repositories.

use chrono::Utc;
use larder_core::StockError;
use larder_core::stock::{LotSnapshot, Movement};
use larder_shared::types::{Amount, Quantity, UnitCost};
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::entities::{inventory_lots, inventory_movements};

/// Maps a database error into the ledger taxonomy.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn db_err(err: DbErr) -> StockError {
    StockError::Database(err.to_string())
}

/// Current time in the column type.
pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Parses a stored quantity. Stored values are canonical, so failure means corruption.
pub(crate) fn quantity(raw: &str) -> Result<Quantity, StockError> {
    Ok(raw.parse::<Quantity>()?)
}

/// Parses a stored unit cost.
pub(crate) fn unit_cost(raw: &str) -> Result<UnitCost, StockError> {
    Ok(raw.parse::<UnitCost>()?)
}

/// Parses a stored amount.
pub(crate) fn amount(raw: &str) -> Result<Amount, StockError> {
    Ok(raw.parse::<Amount>()?)
}

/// Builds the allocator's view of a lot row.
pub(crate) fn lot_snapshot(model: &inventory_lots::Model) -> Result<LotSnapshot, StockError> {
    Ok(LotSnapshot {
        id: model.id.into(),
        item_id: model.item_id.into(),
        branch_id: model.branch_id.into(),
        lot_seq: model.lot_seq,
        received_at: model.received_at.with_timezone(&Utc),
        expiry_date: model.expiry_date,
        received_qty: quantity(&model.received_qty)?,
        remaining_qty: quantity(&model.remaining_qty)?,
        unit_cost: unit_cost(&model.unit_cost)?,
        currency: model.currency.clone(),
    })
}

/// Builds a domain movement from its row.
pub(crate) fn movement(model: &inventory_movements::Model) -> Result<Movement, StockError> {
    Ok(Movement {
        id: model.id.into(),
        item_id: model.item_id.into(),
        lot_id: model.lot_id.into(),
        movement_type: model.movement_type.into(),
        qty: quantity(&model.qty)?,
        unit_cost: unit_cost(&model.unit_cost)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
