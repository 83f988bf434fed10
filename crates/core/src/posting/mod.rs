//! Posting engine rules.
//!
//! This module covers everything about a posting that does not need the
//! database:
//! - Source document identity and the DRAFT/SUBMITTED/POSTED state machine
//! - Posting inputs and their validation
//! - Typed posting results

pub mod document;
pub mod lines;
pub mod outcome;

pub use document::{
    DocumentStatus, DocumentTransition, DocumentWorkflow, PostingGate, SourceRef, SourceType,
};
pub use lines::{
    AdjustmentInput, AdjustmentLine, ConsumptionInput, ConsumptionLine, CostInfo,
    DEFAULT_CURRENCY, LineValidator, PostingRequest, ReceiptInput, ReceiptLine,
};
pub use outcome::{
    AdjustmentPosting, ConsumedLot, ConsumptionPosting, PostedDocument, ProjectionDelta,
    ReceiptPosting,
};
