//! Posting inputs.
//!
//! Lines arrive already validated for shape by the boundary; the checks here
//! are the ones the ledger itself depends on (positive quantities,
//! non-negative costs, a currency code).

use chrono::{DateTime, NaiveDate, Utc};
use larder_shared::types::{LotId, Quantity, UnitCost};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::SourceRef;
use crate::error::StockError;
use crate::stock::{Direction, ItemKey, LotSelection, OrderingPolicy};

/// Currency used when an adjustment names none and the item has no lots.
pub const DEFAULT_CURRENCY: &str = "IDR";

/// Cost attached to an inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Cost of one unit.
    pub unit_cost: UnitCost,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl CostInfo {
    /// Creates cost info, upper-casing the currency code.
    pub fn new(unit_cost: UnitCost, currency: &str) -> Result<Self, StockError> {
        let currency = currency.trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(StockError::InvalidInput(format!(
                "currency must be a 3-letter code, got {currency:?}"
            )));
        }
        if unit_cost.is_negative() {
            return Err(StockError::InvalidQuantity(format!(
                "unit cost cannot be negative, got {unit_cost}"
            )));
        }
        Ok(Self {
            unit_cost,
            currency,
        })
    }
}

/// One received line of a goods receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Item received.
    pub item: ItemKey,
    /// Quantity received.
    pub qty: Quantity,
    /// Purchase cost.
    pub cost: CostInfo,
    /// Optional expiry of the batch.
    pub expiry_date: Option<NaiveDate>,
    /// Quantity the purchase expected, if known.
    pub expected_qty: Option<Quantity>,
    /// Receipt line ID in the owning subsystem, kept on the lot for traceability.
    pub line_ref: Option<Uuid>,
}

/// A goods receipt to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptInput {
    /// The goods receipt document.
    pub source: SourceRef,
    /// When the goods arrived. Drives FIFO order.
    pub received_at: DateTime<Utc>,
    /// Received lines.
    pub lines: Vec<ReceiptLine>,
}

/// One line of a kitchen consumption batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionLine {
    /// Item consumed.
    pub item: ItemKey,
    /// Quantity consumed (positive).
    pub qty: Quantity,
    /// Quantity planned, if known.
    pub expected_qty: Option<Quantity>,
    /// Pin the whole line to one lot instead of walking FIFO.
    pub preferred_lot: Option<LotId>,
}

impl ConsumptionLine {
    /// Lot selection for this line under the call's ordering policy.
    #[must_use]
    pub fn selection(&self, policy: OrderingPolicy) -> LotSelection {
        self.preferred_lot
            .map_or(LotSelection::Ordered(policy), LotSelection::Preferred)
    }
}

/// A consumption batch to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionInput {
    /// The consumption document.
    pub source: SourceRef,
    /// Lot order for the whole batch.
    pub policy: OrderingPolicy,
    /// Consumed lines.
    pub lines: Vec<ConsumptionLine>,
}

/// The single line of a stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// Item adjusted.
    pub item: ItemKey,
    /// Quantity adjusted (positive; direction says which way).
    pub qty: Quantity,
    /// Cost for inbound adjustments. Falls back to the latest lot's cost.
    pub cost: Option<CostInfo>,
    /// Expiry for inbound adjustments.
    pub expiry_date: Option<NaiveDate>,
    /// Pin an outbound adjustment to one lot.
    pub preferred_lot: Option<LotId>,
}

/// A stock adjustment to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentInput {
    /// The adjustment document.
    pub source: SourceRef,
    /// In adds a lot, out depletes lots.
    pub direction: Direction,
    /// Lot order for outbound adjustments.
    pub policy: OrderingPolicy,
    /// The adjusted line.
    pub line: AdjustmentLine,
}

/// Single-line request for the generic posting entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    /// In or out.
    pub direction: Direction,
    /// Document being posted.
    pub source: SourceRef,
    /// Item affected.
    pub item: ItemKey,
    /// Quantity (positive).
    pub qty: Quantity,
    /// Cost for inbound postings.
    pub cost: Option<CostInfo>,
}

/// Input validation - stateless, all methods are associated functions.
pub struct LineValidator;

impl LineValidator {
    /// A receipt needs at least one line, each with a positive quantity.
    /// All lines share one currency, since payables are credited as a single
    /// line.
    pub fn receipt(lines: &[ReceiptLine]) -> Result<(), StockError> {
        let Some(first) = lines.first() else {
            return Err(StockError::InvalidInput(
                "receipt must have at least one line".to_string(),
            ));
        };
        for line in lines {
            if line.cost.currency != first.cost.currency {
                return Err(StockError::InvalidInput(format!(
                    "receipt mixes currencies {} and {}",
                    first.cost.currency, line.cost.currency
                )));
            }
            Self::positive(&line.item, line.qty)?;
            if line.cost.unit_cost.is_negative() {
                return Err(StockError::InvalidQuantity(format!(
                    "unit cost for {} cannot be negative",
                    line.item
                )));
            }
        }
        Ok(())
    }

    /// A consumption needs at least one line, each with a positive quantity.
    pub fn consumption(lines: &[ConsumptionLine]) -> Result<(), StockError> {
        if lines.is_empty() {
            return Err(StockError::InvalidInput(
                "consumption must have at least one line".to_string(),
            ));
        }
        for line in lines {
            Self::positive(&line.item, line.qty)?;
        }
        Ok(())
    }

    /// An adjustment quantity must be positive; direction carries the sign.
    pub fn adjustment(line: &AdjustmentLine) -> Result<(), StockError> {
        Self::positive(&line.item, line.qty)
    }

    fn positive(item: &ItemKey, qty: Quantity) -> Result<(), StockError> {
        if qty.is_positive() {
            Ok(())
        } else {
            Err(StockError::InvalidQuantity(format!(
                "quantity for {item} must be positive, got {qty}"
            )))
        }
    }
}
