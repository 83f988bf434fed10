//! Stock document state machine.
//!
//! Every posting is driven by a source document: a goods receipt, a kitchen
//! consumption batch, or a stock adjustment. Documents move
//! `DRAFT -> SUBMITTED -> POSTED`, with `DISCREPANCY` as a terminal sibling
//! of `POSTED`. Posting a terminal document replays the stored result.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use larder_shared::types::{Quantity, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StockError;
use crate::stock::{Direction, MovementType};

/// Kind of business document behind a movement or journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Goods received against a purchase.
    GoodsReceipt,
    /// Kitchen consumption batch.
    KitchenConsumption,
    /// Manual stock adjustment.
    StockAdjustment,
    /// Reversal of a voided journal. Journals only.
    JournalReversal,
}

impl SourceType {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GoodsReceipt => "GOODS_RECEIPT",
            Self::KitchenConsumption => "KITCHEN_CONSUMPTION",
            Self::StockAdjustment => "STOCK_ADJUSTMENT",
            Self::JournalReversal => "JOURNAL_REVERSAL",
        }
    }

    /// Returns true for documents that move stock.
    #[must_use]
    pub const fn is_stock_document(self) -> bool {
        !matches!(self, Self::JournalReversal)
    }

    /// Statuses from which a document of this type may be posted.
    #[must_use]
    pub const fn postable_from(self) -> &'static [DocumentStatus] {
        match self {
            Self::GoodsReceipt | Self::KitchenConsumption => &[DocumentStatus::Submitted],
            Self::StockAdjustment => &[DocumentStatus::Draft, DocumentStatus::Submitted],
            Self::JournalReversal => &[],
        }
    }

    /// Movement type written when posting this document in `direction`.
    pub fn movement_type(self, direction: Direction) -> Result<MovementType, StockError> {
        match (self, direction) {
            (Self::GoodsReceipt, Direction::In) => Ok(MovementType::Receipt),
            (Self::KitchenConsumption, Direction::Out) => Ok(MovementType::Consumption),
            (Self::StockAdjustment, Direction::In) => Ok(MovementType::AdjustmentIn),
            (Self::StockAdjustment, Direction::Out) => Ok(MovementType::AdjustmentOut),
            _ => Err(StockError::DirectionMismatch {
                source_type: self.to_string(),
                direction: direction.to_string(),
            }),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GOODS_RECEIPT" => Ok(Self::GoodsReceipt),
            "KITCHEN_CONSUMPTION" => Ok(Self::KitchenConsumption),
            "STOCK_ADJUSTMENT" => Ok(Self::StockAdjustment),
            "JOURNAL_REVERSAL" => Ok(Self::JournalReversal),
            _ => Err(format!("Unknown source type: {s}")),
        }
    }
}

/// Identity of a source document: `(source_type, source_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Document kind.
    pub source_type: SourceType,
    /// Document ID in the owning subsystem.
    pub source_id: Uuid,
}

impl SourceRef {
    /// Creates a source reference.
    #[must_use]
    pub const fn new(source_type: SourceType, source_id: Uuid) -> Self {
        Self {
            source_type,
            source_id,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.source_id)
    }
}

/// Stock document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Being prepared.
    Draft,
    /// Ready to post.
    Submitted,
    /// Posted; quantities matched expectations.
    Posted,
    /// Posted; at least one line differed from its expected quantity.
    Discrepancy,
}

impl DocumentStatus {
    /// Returns true once a document has been posted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Posted | Self::Discrepancy)
    }

    /// Returns true if a journal may be generated for the document.
    #[must_use]
    pub const fn authorizes_journal(self) -> bool {
        self.is_terminal()
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Posted => "POSTED",
            Self::Discrepancy => "DISCREPANCY",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a posting call should do with a document in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingGate {
    /// Document is eligible; run the posting.
    Proceed,
    /// Document already posted; return the stored result.
    Replay,
}

/// A validated document transition with audit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTransition {
    /// Status after the transition.
    pub new_status: DocumentStatus,
    /// Who made the transition.
    pub actor: UserId,
    /// When.
    pub at: DateTime<Utc>,
}

/// Stateless document workflow rules.
pub struct DocumentWorkflow;

impl DocumentWorkflow {
    /// Submit a draft document.
    pub fn submit(
        source: &SourceRef,
        current: DocumentStatus,
        actor: UserId,
    ) -> Result<DocumentTransition, StockError> {
        match current {
            DocumentStatus::Draft => Ok(DocumentTransition {
                new_status: DocumentStatus::Submitted,
                actor,
                at: Utc::now(),
            }),
            _ => Err(invalid_state(source, current, "DRAFT")),
        }
    }

    /// Decides whether a posting call proceeds or replays.
    pub fn gate(source: &SourceRef, current: DocumentStatus) -> Result<PostingGate, StockError> {
        if current.is_terminal() {
            return Ok(PostingGate::Replay);
        }

        let allowed = source.source_type.postable_from();
        if allowed.contains(&current) {
            Ok(PostingGate::Proceed)
        } else {
            let expected = allowed
                .iter()
                .map(|status| status.as_str())
                .collect::<Vec<_>>()
                .join(" or ");
            Err(invalid_state(source, current, &expected))
        }
    }

    /// Terminal status after posting: `DISCREPANCY` if any line with an
    /// expected quantity posted something different, else `POSTED`.
    pub fn resolve_terminal<I>(lines: I) -> DocumentStatus
    where
        I: IntoIterator<Item = (Option<Quantity>, Quantity)>,
    {
        let mismatch = lines
            .into_iter()
            .any(|(expected, posted)| expected.is_some_and(|expected| expected != posted));
        if mismatch {
            DocumentStatus::Discrepancy
        } else {
            DocumentStatus::Posted
        }
    }

    /// Marks a document posted.
    #[must_use]
    pub fn post(new_status: DocumentStatus, actor: UserId) -> DocumentTransition {
        DocumentTransition {
            new_status,
            actor,
            at: Utc::now(),
        }
    }

    /// Checks that a document's status allows journal generation.
    pub fn ensure_journal_allowed(
        source: &SourceRef,
        current: DocumentStatus,
    ) -> Result<(), StockError> {
        if current.authorizes_journal() {
            Ok(())
        } else {
            Err(invalid_state(source, current, "POSTED or DISCREPANCY"))
        }
    }
}

fn invalid_state(source: &SourceRef, current: DocumentStatus, expected: &str) -> StockError {
    StockError::InvalidState {
        subject: format!("Document {source}"),
        status: current.to_string(),
        expected: expected.to_string(),
    }
}
