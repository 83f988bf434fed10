//! Application-wide error types.
//!
//! `AppError` is what the outer boundary sees. Domain errors from the core
//! convert into it, keeping their machine-readable code.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (also used for cross-tenant access).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {message}")]
    BusinessRule {
        /// Machine-readable error kind.
        code: &'static str,
        /// Human-readable detail.
        message: String,
    },

    /// Conflict with the current state of a resource.
    #[error("Conflict: {message}")]
    Conflict {
        /// Machine-readable error kind.
        code: &'static str,
        /// Human-readable detail.
        message: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule { .. } => 422,
            Self::Conflict { .. } => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule { code, .. } | Self::Conflict { code, .. } => *code,
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for 5xx-class errors.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Message safe to show a caller. Server errors never expose internals.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(
            AppError::BusinessRule {
                code: "INSUFFICIENT_STOCK",
                message: String::new()
            }
            .status_code(),
            422
        );
        assert_eq!(
            AppError::Conflict {
                code: "INVALID_STATE",
                message: String::new()
            }
            .status_code(),
            409
        );
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes_keep_domain_kind() {
        let err = AppError::BusinessRule {
            code: "PREFERRED_LOT_INVALID",
            message: "lot exhausted".into(),
        };
        assert_eq!(err.error_code(), "PREFERRED_LOT_INVALID");
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::Database("connection refused at 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::NotFound("item".into());
        assert_eq!(err.public_message(), "Not found: item");
    }
}
