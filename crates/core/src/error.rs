//! Stock and posting error types.
//!
//! Every business failure raised inside a posting transaction is one of these
//! variants. The repository layer returns them unchanged after rolling back,
//! so callers can match on the kind instead of parsing messages.

use larder_shared::AppError;
use larder_shared::types::{Amount, FixedError, ItemId, LotId, Quantity};
use thiserror::Error;

/// Errors that can occur during ledger, posting, and journal operations.
#[derive(Debug, Error)]
pub enum StockError {
    // ========== State Errors ==========
    /// The subject is not in a state that allows the requested transition.
    #[error("{subject} is {status}, expected {expected}")]
    InvalidState {
        /// What was being transitioned (document or journal reference).
        subject: String,
        /// Current status.
        status: String,
        /// Status (or statuses) the transition requires.
        expected: String,
    },

    /// The posting direction does not fit the document type.
    #[error("{direction} is not a valid direction for {source_type} documents")]
    DirectionMismatch {
        /// Document source type.
        source_type: String,
        /// Requested direction.
        direction: String,
    },

    // ========== Stock Errors ==========
    /// Not enough stock across all lots to satisfy the request.
    #[error("Insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Item being consumed.
        item_id: ItemId,
        /// Quantity asked for.
        requested: Quantity,
        /// Quantity remaining across all lots.
        available: Quantity,
    },

    /// The pinned lot cannot be used for this consumption.
    #[error("Preferred lot {lot_id} is invalid: {reason}")]
    PreferredLotInvalid {
        /// The lot the caller asked for.
        lot_id: LotId,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A quantity or unit cost is out of range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    // ========== Input Errors ==========
    /// Request input other than a quantity is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========== Accounting Errors ==========
    /// The derived journal total is zero or negative.
    #[error("Nothing to post: journal total is {total}")]
    NonPostable {
        /// Derived debit total.
        total: Amount,
    },

    /// A derived journal does not balance. Indicates a derivation bug.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedJournal {
        /// Total debit amount.
        debit: Amount,
        /// Total credit amount.
        credit: Amount,
    },

    /// A required account code is not configured for the company.
    #[error("Account code {code} is not configured for this company")]
    MissingAccount {
        /// Missing account code.
        code: &'static str,
    },

    // ========== Access Errors ==========
    /// Entity does not exist in the caller's company/branch.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Identifier the caller supplied.
        id: String,
    },

    // ========== Fatal Errors ==========
    /// FIFO loop finished with demand left over after the availability check passed.
    #[error("Allocation for item {item_id} left {remaining} unallocated")]
    AllocationIncomplete {
        /// Item being consumed.
        item_id: ItemId,
        /// Demand still outstanding.
        remaining: Quantity,
    },

    /// Fixed-point arithmetic overflowed.
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] FixedError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StockError {
    /// Shorthand for a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DirectionMismatch { .. } => "DIRECTION_MISMATCH",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::PreferredLotInvalid { .. } => "PREFERRED_LOT_INVALID",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NonPostable { .. } => "NON_POSTABLE",
            Self::UnbalancedJournal { .. } => "UNBALANCED_JOURNAL",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AllocationIncomplete { .. } => "ALLOCATION_INCOMPLETE",
            Self::Arithmetic(_) => "ARITHMETIC_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidQuantity(_) | Self::InvalidInput(_) | Self::DirectionMismatch { .. } => {
                400
            }

            // 404 Not Found - also covers cross-tenant access
            Self::NotFound { .. } => 404,

            // 409 Conflict - wrong document/journal state
            Self::InvalidState { .. } => 409,

            // 422 Unprocessable Entity - business rule violations
            Self::InsufficientStock { .. }
            | Self::PreferredLotInvalid { .. }
            | Self::NonPostable { .. } => 422,

            // 500 Internal Server Error
            Self::UnbalancedJournal { .. }
            | Self::MissingAccount { .. }
            | Self::AllocationIncomplete { .. }
            | Self::Arithmetic(_)
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns true for errors that indicate a broken invariant or
    /// infrastructure failure rather than a business rule.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.http_status_code() >= 500
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let code = err.error_code();
        let fatal = err.is_fatal();
        let message = err.to_string();
        match err {
            StockError::NotFound { .. } => Self::NotFound(message),
            StockError::InvalidQuantity(_)
            | StockError::InvalidInput(_)
            | StockError::DirectionMismatch { .. } => Self::Validation(message),
            StockError::InvalidState { .. } => Self::Conflict { code, message },
            StockError::Database(msg) => Self::Database(msg),
            _ if fatal => Self::Internal(message),
            _ => Self::BusinessRule { code, message },
        }
    }
}
