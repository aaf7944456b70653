//! Database enum types mapped to Postgres enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Postgres `account_type` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    /// Resources owned.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Obligations owed.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Owner's residual interest.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income earned.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Costs incurred.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Postgres `fiscal_period_status` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fiscal_period_status")]
pub enum FiscalPeriodStatus {
    /// Open for posting.
    #[sea_orm(string_value = "open")]
    Open,
    /// Closed; can be reopened.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Locked; terminal.
    #[sea_orm(string_value = "locked")]
    Locked,
}

/// Postgres `audit_operation` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_operation")]
pub enum AuditOperation {
    /// A row was created.
    #[sea_orm(string_value = "insert")]
    Insert,
    /// A row was updated.
    #[sea_orm(string_value = "update")]
    Update,
    /// A row was deleted.
    #[sea_orm(string_value = "delete")]
    Delete,
    /// A journal entry was posted.
    #[sea_orm(string_value = "post")]
    Post,
    /// A journal entry was reversed.
    #[sea_orm(string_value = "reverse")]
    Reverse,
    /// A fiscal period reopen was attempted.
    #[sea_orm(string_value = "reopen")]
    Reopen,
}

impl From<ledgerline_core::accounts::AccountType> for AccountType {
    fn from(value: ledgerline_core::accounts::AccountType) -> Self {
        use ledgerline_core::accounts::AccountType as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Revenue => Self::Revenue,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for ledgerline_core::accounts::AccountType {
    fn from(value: AccountType) -> Self {
        use ledgerline_core::accounts::AccountType as Core;
        match value {
            AccountType::Asset => Core::Asset,
            AccountType::Liability => Core::Liability,
            AccountType::Equity => Core::Equity,
            AccountType::Revenue => Core::Revenue,
            AccountType::Expense => Core::Expense,
        }
    }
}

impl From<ledgerline_core::fiscal::FiscalPeriodStatus> for FiscalPeriodStatus {
    fn from(value: ledgerline_core::fiscal::FiscalPeriodStatus) -> Self {
        use ledgerline_core::fiscal::FiscalPeriodStatus as Core;
        match value {
            Core::Open => Self::Open,
            Core::Closed => Self::Closed,
            Core::Locked => Self::Locked,
        }
    }
}

impl From<FiscalPeriodStatus> for ledgerline_core::fiscal::FiscalPeriodStatus {
    fn from(value: FiscalPeriodStatus) -> Self {
        use ledgerline_core::fiscal::FiscalPeriodStatus as Core;
        match value {
            FiscalPeriodStatus::Open => Core::Open,
            FiscalPeriodStatus::Closed => Core::Closed,
            FiscalPeriodStatus::Locked => Core::Locked,
        }
    }
}

impl From<ledgerline_core::audit::AuditOperation> for AuditOperation {
    fn from(value: ledgerline_core::audit::AuditOperation) -> Self {
        use ledgerline_core::audit::AuditOperation as Core;
        match value {
            Core::Insert => Self::Insert,
            Core::Update => Self::Update,
            Core::Delete => Self::Delete,
            Core::Post => Self::Post,
            Core::Reverse => Self::Reverse,
            Core::Reopen => Self::Reopen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_status_roundtrip_through_core() {
        use ledgerline_core::fiscal::FiscalPeriodStatus as Core;
        for status in [Core::Open, Core::Closed, Core::Locked] {
            let db: FiscalPeriodStatus = status.into();
            let back: Core = db.into();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_account_type_roundtrip_through_core() {
        use ledgerline_core::accounts::AccountType as Core;
        for t in [
            Core::Asset,
            Core::Liability,
            Core::Equity,
            Core::Revenue,
            Core::Expense,
        ] {
            let db: AccountType = t.into();
            let back: Core = db.into();
            assert_eq!(back, t);
        }
    }
}
