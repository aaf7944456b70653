//! Errors for chart of accounts operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur managing the chart of accounts.
#[derive(Debug, Error)]
pub enum AccountError {
    /// An account with this code already exists for the organization.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// No active account with this code.
    #[error("Unknown account code: {0}")]
    UnknownAccount(String),

    /// Account code is malformed.
    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    /// Account has lines in an open period and deactivation is blocked by policy.
    #[error("Account {0} is referenced by journal lines in an open period")]
    AccountInUse(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::InvalidCode(_) => "INVALID_CODE",
            Self::AccountInUse(_) => "ACCOUNT_IN_USE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::DuplicateCode(_) => 409,
            Self::UnknownAccount(_) => 404,
            Self::InvalidCode(_) => 400,
            Self::AccountInUse(_) => 422,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AccountError::DuplicateCode("1000".into()).error_code(),
            "DUPLICATE_CODE"
        );
        assert_eq!(
            AccountError::UnknownAccount("9999".into()).error_code(),
            "UNKNOWN_ACCOUNT"
        );
        assert_eq!(
            AccountError::AccountInUse(Uuid::nil()).error_code(),
            "ACCOUNT_IN_USE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(AccountError::DuplicateCode(String::new()).http_status_code(), 409);
        assert_eq!(AccountError::UnknownAccount(String::new()).http_status_code(), 404);
        assert_eq!(AccountError::InvalidCode(String::new()).http_status_code(), 400);
        assert_eq!(AccountError::AccountInUse(Uuid::nil()).http_status_code(), 422);
        assert_eq!(AccountError::Database(String::new()).http_status_code(), 500);
    }
}
