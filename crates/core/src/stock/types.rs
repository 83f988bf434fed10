//! Inventory domain types: items, lots, movements, and allocations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use larder_shared::types::{BranchId, ItemId, LotId, MovementId, Quantity, UnitCost};
use serde::{Deserialize, Serialize};

use crate::error::StockError;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Stock enters the branch; a new lot is created.
    In,
    /// Stock leaves the branch; existing lots are depleted.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

/// Movement classification.
///
/// Receipt and adjustment-in open a lot; consumption and adjustment-out
/// deplete existing lots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Goods received from a supplier.
    Receipt,
    /// Stock used by the kitchen.
    Consumption,
    /// Manual correction adding stock.
    AdjustmentIn,
    /// Manual correction removing stock (waste, spoilage, count loss).
    AdjustmentOut,
}

impl MovementType {
    /// Direction of this movement type.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Receipt | Self::AdjustmentIn => Direction::In,
            Self::Consumption | Self::AdjustmentOut => Direction::Out,
        }
    }

    /// Returns true for lot-opening movement types.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self.direction(), Direction::In)
    }

    /// Applies this movement's sign to a quantity: positive in, negative out.
    #[must_use]
    pub fn signed(self, qty: Quantity) -> Quantity {
        if self.is_inbound() { qty.abs() } else { -qty.abs() }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "RECEIPT",
            Self::Consumption => "CONSUMPTION",
            Self::AdjustmentIn => "ADJUSTMENT_IN",
            Self::AdjustmentOut => "ADJUSTMENT_OUT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIPT" => Ok(Self::Receipt),
            "CONSUMPTION" => Ok(Self::Consumption),
            "ADJUSTMENT_IN" => Ok(Self::AdjustmentIn),
            "ADJUSTMENT_OUT" => Ok(Self::AdjustmentOut),
            _ => Err(format!("Unknown movement type: {s}")),
        }
    }
}

/// Natural key of an inventory item inside a branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Item name as entered, trimmed.
    pub name: String,
    /// Unit of measure, trimmed.
    pub unit: String,
}

impl ItemKey {
    /// Builds a key, trimming surrounding whitespace.
    pub fn new(name: &str, unit: &str) -> Result<Self, StockError> {
        let name = name.trim();
        let unit = unit.trim();
        if name.is_empty() || unit.is_empty() {
            return Err(StockError::InvalidInput(
                "item name and unit are required".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            unit: unit.to_string(),
        })
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unit)
    }
}

/// Lot ordering used by FIFO consumption. Fixed for a whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Oldest receipt first, ties broken by creation order.
    #[default]
    ReceiptOrder,
    /// Nearest expiry first, lots without expiry last, then receipt order.
    ExpiryFirst,
}

/// How lots are chosen for one consumption line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotSelection {
    /// Walk all candidate lots in the given order.
    Ordered(OrderingPolicy),
    /// Take everything from a single named lot.
    Preferred(LotId),
}

impl Default for LotSelection {
    fn default() -> Self {
        Self::Ordered(OrderingPolicy::default())
    }
}

/// A lot as read (and locked) from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSnapshot {
    /// Lot ID.
    pub id: LotId,
    /// Item the lot belongs to.
    pub item_id: ItemId,
    /// Branch holding the stock.
    pub branch_id: BranchId,
    /// Per-item creation sequence, the stable tie-breaker.
    pub lot_seq: i64,
    /// When the stock was received.
    pub received_at: DateTime<Utc>,
    /// Optional expiry date.
    pub expiry_date: Option<NaiveDate>,
    /// Quantity received. Immutable.
    pub received_qty: Quantity,
    /// Quantity still available.
    pub remaining_qty: Quantity,
    /// Cost of one unit. Immutable.
    pub unit_cost: UnitCost,
    /// Currency of `unit_cost`.
    pub currency: String,
}

/// Quantity taken from one lot by one consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Lot depleted.
    pub lot_id: LotId,
    /// Quantity taken (positive).
    pub qty_taken: Quantity,
    /// Unit cost of the lot, carried onto the movement.
    pub unit_cost: UnitCost,
    /// Lot remaining quantity after this allocation.
    pub remaining_after: Quantity,
}

/// A movement as written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Movement ID.
    pub id: MovementId,
    /// Item affected.
    pub item_id: ItemId,
    /// Lot affected.
    pub lot_id: LotId,
    /// Movement classification.
    pub movement_type: MovementType,
    /// Signed quantity: positive in, negative out.
    pub qty: Quantity,
    /// Unit cost of the affected lot.
    pub unit_cost: UnitCost,
    /// When the movement was written.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_movement_sign() {
        let qty = Quantity::new(dec!(2.5));
        assert_eq!(MovementType::Receipt.signed(qty), qty);
        assert_eq!(MovementType::Consumption.signed(qty), -qty);
        assert_eq!(MovementType::AdjustmentOut.signed(-qty), -qty);
        assert_eq!(MovementType::AdjustmentIn.signed(-qty), qty);
    }

    #[test]
    fn test_movement_type_round_trips_through_storage_form() {
        for kind in [
            MovementType::Receipt,
            MovementType::Consumption,
            MovementType::AdjustmentIn,
            MovementType::AdjustmentOut,
        ] {
            assert_eq!(kind.as_str().parse::<MovementType>().unwrap(), kind);
        }
        assert!("SALE".parse::<MovementType>().is_err());
    }

    #[test]
    fn test_item_key_trims_and_requires_values() {
        let key = ItemKey::new("  Flour ", " kg").unwrap();
        assert_eq!(key.name, "Flour");
        assert_eq!(key.unit, "kg");
        assert_eq!(key.to_string(), "Flour (kg)");
        assert_eq!(
            ItemKey::new("  ", "kg").unwrap_err().error_code(),
            "INVALID_INPUT"
        );
        assert!(ItemKey::new("Flour", "").is_err());
    }
}
