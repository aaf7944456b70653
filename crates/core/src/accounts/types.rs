//! Account types for the chart of accounts.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::{AccountId, OrganizationId};
use serde::{Deserialize, Serialize};

use super::error::AccountError;

/// The five fundamental account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed (payables, loans).
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

/// Which side increases an account of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Organization this account belongs to.
    pub organization_id: OrganizationId,
    /// Account code, unique within the organization (e.g., "1000").
    pub code: String,
    /// Human-readable name (e.g., "Cash").
    pub name: String,
    /// The fundamental account type.
    pub account_type: AccountType,
    /// Whether the account accepts new journal lines.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an `ensure` (upsert) call.
///
/// The conflict is reported, never silently swallowed: callers learn whether
/// the account was created by this call or already existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnsureOutcome {
    /// The account did not exist and was created.
    Created(Account),
    /// An account with this code already existed; it is returned unchanged.
    AlreadyExisted(Account),
}

impl EnsureOutcome {
    /// Returns the account regardless of outcome.
    #[must_use]
    pub fn account(&self) -> &Account {
        match self {
            Self::Created(account) | Self::AlreadyExisted(account) => account,
        }
    }

    /// True if this call created the account.
    #[must_use]
    pub const fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Validates an account code: non-empty, at most 32 chars, alphanumeric
/// with dots and dashes.
///
/// # Errors
///
/// Returns `AccountError::InvalidCode` if the code is malformed.
pub fn validate_code(code: &str) -> Result<(), AccountError> {
    if code.is_empty() || code.len() > 32 {
        return Err(AccountError::InvalidCode(code.to_string()));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(AccountError::InvalidCode(code.to_string()));
    }
    Ok(())
}
