//! Idempotency guard errors.

use larder_shared::AppError;
use thiserror::Error;

/// Errors raised by the guard itself, before the wrapped operation runs.
#[derive(Debug, Error)]
pub enum IdempotencyError {
    /// The key was already used with a different request.
    #[error("Idempotency key {key} was reused with a different request")]
    Conflict {
        /// Offending key.
        key: String,
    },

    /// A request with the same key is still running.
    #[error("A request with idempotency key {key} is still in progress")]
    InProgress {
        /// Offending key.
        key: String,
    },

    /// Storage failure while checking or recording the key.
    #[error("Idempotency store error: {0}")]
    Database(String),
}

impl IdempotencyError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "IDEMPOTENCY_CONFLICT",
            Self::InProgress { .. } => "IDEMPOTENCY_IN_PROGRESS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status code the boundary should answer with.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Conflict { .. } => 422,
            Self::InProgress { .. } => 409,
            Self::Database(_) => 500,
        }
    }
}

impl From<IdempotencyError> for AppError {
    fn from(err: IdempotencyError) -> Self {
        let code = err.error_code();
        let message = err.to_string();
        match err {
            IdempotencyError::Conflict { .. } => Self::BusinessRule { code, message },
            IdempotencyError::InProgress { .. } => Self::Conflict { code, message },
            IdempotencyError::Database(msg) => Self::Database(msg),
        }
    }
}

/// Failure of a guarded call.
///
/// Guard failures and failures of the wrapped operation stay distinct so
/// the caller can tell "never ran" from "ran and failed".
#[derive(Debug, Error)]
pub enum GuardError<E> {
    /// The guard rejected or could not record the request.
    #[error(transparent)]
    Idempotency(#[from] IdempotencyError),

    /// The wrapped operation failed. Its reservation has been released.
    #[error("{0}")]
    Operation(E),
}

impl<E> GuardError<E> {
    /// The wrapped operation's error, if that is what failed.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            Self::Idempotency(_) => None,
        }
    }
}

impl<E> From<GuardError<E>> for AppError
where
    E: Into<AppError>,
{
    fn from(err: GuardError<E>) -> Self {
        match err {
            GuardError::Idempotency(err) => err.into(),
            GuardError::Operation(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;

    #[test]
    fn test_status_codes() {
        let conflict = IdempotencyError::Conflict { key: "k1".into() };
        assert_eq!(conflict.http_status_code(), 422);
        assert_eq!(AppError::from(conflict).error_code(), "IDEMPOTENCY_CONFLICT");

        let running = IdempotencyError::InProgress { key: "k1".into() };
        assert_eq!(AppError::from(running).status_code(), 409);
    }

    #[test]
    fn test_guard_error_keeps_operation_error() {
        let err: GuardError<StockError> = GuardError::Operation(StockError::NonPostable {
            total: larder_shared::types::Amount::zero(),
        });
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "NON_POSTABLE");

        let err: GuardError<StockError> =
            IdempotencyError::InProgress { key: "k".into() }.into();
        assert!(err.into_operation().is_none());
    }
}
