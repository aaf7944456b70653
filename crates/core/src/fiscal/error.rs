//! Errors for fiscal period operations.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use super::period::FiscalPeriodStatus;

/// Errors that can occur managing fiscal periods.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// Start date must precede end date.
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// The requested range overlaps an existing period.
    #[error("Date range overlaps existing period: {0}")]
    OverlappingPeriod(String),

    /// The requested status transition is not allowed.
    #[error("Invalid period transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: FiscalPeriodStatus,
        /// Requested status.
        to: FiscalPeriodStatus,
    },

    /// Period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(Uuid),

    /// The actor's role may not reopen periods.
    #[error("Role is not permitted to reopen fiscal periods")]
    ReopenForbidden,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OverlappingPeriod(_) => "OVERLAPPING_PERIOD",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::ReopenForbidden => "REOPEN_FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } => 400,
            Self::OverlappingPeriod(_) => 409,
            Self::InvalidTransition { .. } => 409,
            Self::PeriodNotFound(_) => 404,
            Self::ReopenForbidden => 403,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_statuses() {
        let err = FiscalError::InvalidTransition {
            from: FiscalPeriodStatus::Locked,
            to: FiscalPeriodStatus::Open,
        };
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.to_string(), "Invalid period transition: locked -> open");

        assert_eq!(FiscalError::ReopenForbidden.http_status_code(), 403);
        assert_eq!(
            FiscalError::PeriodNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }
}
