//! Inventory ledger rules.
//!
//! This module implements the stock side of the ledger:
//! - Item, lot, and movement types
//! - FIFO lot allocation with receipt-order and expiry-first policies
//! - On-hand projection and conservation audits

pub mod fifo;
pub mod projection;
pub mod types;

#[cfg(test)]
mod fifo_props;

pub use fifo::FifoAllocator;
pub use projection::{AuditReport, ItemAudit, LotAudit, Projection};
pub use types::{
    Allocation, Direction, ItemKey, LotSelection, LotSnapshot, Movement, MovementType,
    OrderingPolicy,
};
