//! Journal engine error types.
//!
//! Every failure is synchronous and carries enough context to act on
//! (imbalance totals, offending account code, period name and status).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::fiscal::FiscalPeriodStatus;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines to post.
    #[error("Entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}, Difference: {difference}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// Signed difference (debit - credit).
        difference: Decimal,
    },

    /// Line amount cannot be zero.
    #[error("Line amount cannot be zero")]
    ZeroAmount,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// Line must specify either debit or credit, not both.
    #[error("Line must specify either debit or credit, not both")]
    BothSides,

    /// Amounts carry at most two fractional digits.
    #[error("Amount {0} exceeds two decimal places")]
    InvalidPrecision(Decimal),

    // ========== Account Errors ==========
    /// No active account with this code (absent or deactivated).
    #[error("Unknown account code: {0}")]
    UnknownAccount(String),

    // ========== Fiscal Period Errors ==========
    /// No fiscal period covers the date; fail-closed, treated as locked.
    #[error("No fiscal period covers date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// The covering period does not accept posting.
    #[error("Fiscal period {name} is {status}, posting not allowed")]
    PeriodLocked {
        /// Name of the covering period.
        name: String,
        /// Its current status.
        status: FiscalPeriodStatus,
    },

    // ========== State Errors ==========
    /// Posted entries are immutable.
    #[error("Entry {0} is posted and cannot be modified")]
    ImmutableEntry(Uuid),

    /// Entry is already posted.
    #[error("Entry {0} is already posted")]
    AlreadyPosted(Uuid),

    /// Entry must be posted first.
    #[error("Entry {0} is not posted")]
    NotPosted(Uuid),

    /// Entry has already been reversed.
    #[error("Entry {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// Reversal date cannot precede the original entry date.
    #[error("Reversal date {reversal_date} precedes original entry date {entry_date}")]
    ReversalPredatesOriginal {
        /// The original entry date.
        entry_date: NaiveDate,
        /// The requested reversal date.
        reversal_date: NaiveDate,
    },

    /// Entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    // ========== Policy Errors ==========
    /// The actor's role does not allow this operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::BothSides => "BOTH_SIDES",
            Self::InvalidPrecision(_) => "INVALID_PRECISION",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::NoFiscalPeriod(_) => "NO_FISCAL_PERIOD",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::ImmutableEntry(_) => "IMMUTABLE_ENTRY",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::ReversalPredatesOriginal { .. } => "REVERSAL_PREDATES_ORIGINAL",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientLines
            | Self::UnbalancedEntry { .. }
            | Self::ZeroAmount
            | Self::NegativeAmount
            | Self::BothSides
            | Self::InvalidPrecision(_) => 400,

            // 403 Forbidden - permission errors
            Self::Forbidden(_) => 403,

            // 404 Not Found
            Self::UnknownAccount(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict - state errors
            Self::ImmutableEntry(_)
            | Self::AlreadyPosted(_)
            | Self::NotPosted(_)
            | Self::AlreadyReversed(_) => 409,

            // 422 Unprocessable - policy gates
            Self::NoFiscalPeriod(_)
            | Self::PeriodLocked { .. }
            | Self::ReversalPredatesOriginal { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientLines.error_code(),
            "INSUFFICIENT_LINES"
        );
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: dec!(100.00),
                credit: dec!(95.00),
                difference: dec!(5.00),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::AlreadyPosted(Uuid::nil()).error_code(),
            "ALREADY_POSTED"
        );
        assert_eq!(
            LedgerError::PeriodLocked {
                name: "2026-01".to_string(),
                status: FiscalPeriodStatus::Locked,
            }
            .error_code(),
            "PERIOD_LOCKED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientLines.http_status_code(), 400);
        assert_eq!(
            LedgerError::Forbidden("posting".into()).http_status_code(),
            403
        );
        assert_eq!(
            LedgerError::UnknownAccount("9999".into()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::AlreadyPosted(Uuid::nil()).http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::NoFiscalPeriod(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
                .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_unbalanced_display_reports_difference() {
        let err = LedgerError::UnbalancedEntry {
            debit: dec!(100.00),
            credit: dec!(95.00),
            difference: dec!(5.00),
        };
        assert_eq!(
            err.to_string(),
            "Entry is not balanced. Debit: 100.00, Credit: 95.00, Difference: 5.00"
        );
    }
}
