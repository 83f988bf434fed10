//! Typed results returned by posting operations.
//!
//! Every posting call returns one of these, whether it ran or replayed, so
//! callers never have to dig a journal ID out of an untyped payload.

use larder_shared::types::{DocumentId, ItemId, JournalId, LotId, MovementId, Quantity, UnitCost};
use serde::{Deserialize, Serialize};

use super::document::{DocumentStatus, SourceRef};
use crate::stock::{Direction, LotSnapshot, Movement};

/// On-hand before and after a posting, per item touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionDelta {
    /// Item recomputed.
    pub item_id: ItemId,
    /// Cached on-hand before the posting.
    pub before: Quantity,
    /// Recomputed on-hand after the posting.
    pub after: Quantity,
}

/// Stock taken from one lot by an outbound posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedLot {
    /// Item consumed.
    pub item_id: ItemId,
    /// Lot depleted.
    pub lot_id: LotId,
    /// Movement recording the depletion.
    pub movement_id: MovementId,
    /// Quantity taken (positive).
    pub qty_taken: Quantity,
    /// Cost of one unit of the lot.
    pub unit_cost: UnitCost,
}

impl ConsumedLot {
    /// Builds the allocation view of an outbound movement.
    #[must_use]
    pub fn from_movement(movement: &Movement) -> Self {
        Self {
            item_id: movement.item_id,
            lot_id: movement.lot_id,
            movement_id: movement.id,
            qty_taken: movement.qty.abs(),
            unit_cost: movement.unit_cost,
        }
    }
}

/// Document header fields shared by all posting results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedDocument {
    /// Stock document row ID; also the posting ID.
    pub document_id: DocumentId,
    /// Business document reference.
    pub source: SourceRef,
    /// Terminal status reached.
    pub status: DocumentStatus,
    /// Journal generated for the posting, if any value moved.
    pub journal_id: Option<JournalId>,
    /// True when the document was already posted and this is the stored result.
    pub replayed: bool,
}

/// Result of posting a goods receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPosting {
    /// Document header.
    pub document: PostedDocument,
    /// One new lot per line, as received.
    pub lots: Vec<LotSnapshot>,
    /// One inbound movement per lot.
    pub movements: Vec<Movement>,
    /// Projection change per item, as recorded when first posted.
    pub projections: Vec<ProjectionDelta>,
}

/// Result of posting a kitchen consumption batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionPosting {
    /// Document header.
    pub document: PostedDocument,
    /// One entry per lot touched, in consumption order.
    pub allocations: Vec<ConsumedLot>,
    /// One outbound movement per lot touched.
    pub movements: Vec<Movement>,
    /// Projection change per item, as recorded when first posted.
    pub projections: Vec<ProjectionDelta>,
}

/// Result of posting a stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentPosting {
    /// Document header.
    pub document: PostedDocument,
    /// Which way stock moved.
    pub direction: Direction,
    /// Lot created by an inbound adjustment.
    pub lot: Option<LotSnapshot>,
    /// Movements written (one for in, one per lot touched for out).
    pub movements: Vec<Movement>,
    /// Projection change for the item, as recorded when first posted.
    pub projections: Vec<ProjectionDelta>,
}
