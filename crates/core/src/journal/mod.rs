//! Accounting journals derived from posted movements.
//!
//! Journals are never written by hand. They are computed from the movements
//! of one source document, or from another journal when voiding it.

pub mod builder;
pub mod reversal;
pub mod types;

#[cfg(test)]
mod builder_props;

pub use builder::JournalBuilder;
pub use reversal::ReversalService;
pub use types::{
    AccountCode, EntrySide, JournalDraft, JournalLineDraft, JournalStatus, JournalTotals,
    PostedMovement,
};
