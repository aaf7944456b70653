//! Posting guards for journal entries.
//!
//! This service contains pure business logic with no database dependencies.
//! Account resolution and period lookup are injected as closures so the
//! repository layer can run these guards inside its transaction.

use chrono::NaiveDate;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{EntryTotals, JournalEntry, JournalLine};
use super::validation;
use crate::fiscal::FiscalPeriodStatus;

/// Information about an account needed for posting validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// The account code, used in error reporting.
    pub code: String,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Information about the fiscal period covering a date.
#[derive(Debug, Clone)]
pub struct PeriodInfo {
    /// Period name, used in error reporting.
    pub name: String,
    /// Current period status.
    pub status: FiscalPeriodStatus,
}

/// Posting and mutation guards for journal entries.
pub struct JournalService;

impl JournalService {
    /// Validates that an entry can be posted.
    ///
    /// Guards run in order:
    /// 1. Not already posted
    /// 2. At least 2 lines, each with a valid debit/credit shape
    /// 3. Every line's account resolves to an active account
    /// 4. Debits equal credits exactly
    /// 5. The entry date falls in an open fiscal period (fail-closed)
    ///
    /// # Arguments
    ///
    /// * `entry` - The entry header
    /// * `lines` - The entry's lines
    /// * `account_validator` - Resolves an account id to its current state
    /// * `period_lookup` - Finds the period covering a date, if any
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` naming the first failed guard.
    pub fn validate_for_posting<A, P>(
        entry: &JournalEntry,
        lines: &[JournalLine],
        account_validator: A,
        period_lookup: P,
    ) -> Result<EntryTotals, LedgerError>
    where
        A: Fn(Uuid) -> Result<AccountInfo, LedgerError>,
        P: Fn(NaiveDate) -> Option<PeriodInfo>,
    {
        if entry.posted {
            return Err(LedgerError::AlreadyPosted(entry.id.into_inner()));
        }

        if lines.len() < 2 {
            return Err(LedgerError::InsufficientLines);
        }

        for line in lines {
            validation::validate_amounts(Some(line.debit), Some(line.credit))?;

            // Accounts are re-read inside the posting transaction, so a
            // deactivation is visible to the very next post.
            let account = account_validator(line.account_id.into_inner())?;
            if !account.is_active {
                return Err(LedgerError::UnknownAccount(account.code));
            }
        }

        let totals = validation::validate_balanced(lines)?;

        Self::check_period(entry.entry_date, &period_lookup)?;

        Ok(totals)
    }

    /// Checks the fiscal period gate for a date.
    ///
    /// Fail-closed: a date covered by no period is treated as locked.
    ///
    /// # Errors
    ///
    /// - `NoFiscalPeriod` when no period covers the date
    /// - `PeriodLocked` when the covering period is not open
    pub fn check_period<P>(date: NaiveDate, period_lookup: &P) -> Result<(), LedgerError>
    where
        P: Fn(NaiveDate) -> Option<PeriodInfo>,
    {
        let Some(period) = period_lookup(date) else {
            return Err(LedgerError::NoFiscalPeriod(date));
        };
        if period.status != FiscalPeriodStatus::Open {
            return Err(LedgerError::PeriodLocked {
                name: period.name,
                status: period.status,
            });
        }
        Ok(())
    }

    /// Validates that an entry can be modified. Posted entries are immutable.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableEntry` if the entry is posted.
    pub fn validate_can_modify(entry: &JournalEntry) -> Result<(), LedgerError> {
        if entry.posted {
            return Err(LedgerError::ImmutableEntry(entry.id.into_inner()));
        }
        Ok(())
    }

    /// Validates that an entry can be deleted. Only unposted drafts can.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableEntry` if the entry is posted.
    pub fn validate_can_delete(entry: &JournalEntry) -> Result<(), LedgerError> {
        Self::validate_can_modify(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerline_shared::types::{
        AccountId, JournalEntryId, JournalLineId, OrganizationId, UserId,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn make_entry(posted: bool) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            organization_id: OrganizationId::new(),
            entry_number: 1,
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Office supplies".to_string(),
            posted,
            posted_at: posted.then(Utc::now),
            reverses_entry_id: None,
            reversed_by_entry_id: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_line(debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            entry_id: JournalEntryId::new(),
            account_id: AccountId::new(),
            line_number: 1,
            debit,
            credit,
            cost_center_id: None,
            memo: None,
        }
    }

    fn active_account(id: Uuid) -> Result<AccountInfo, LedgerError> {
        Ok(AccountInfo {
            id,
            code: "1000".to_string(),
            is_active: true,
        })
    }

    fn open_period(_date: NaiveDate) -> Option<PeriodInfo> {
        Some(PeriodInfo {
            name: "2026-01".to_string(),
            status: FiscalPeriodStatus::Open,
        })
    }

    #[test]
    fn test_balanced_draft_posts() {
        let entry = make_entry(false);
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];

        let totals =
            JournalService::validate_for_posting(&entry, &lines, active_account, open_period)
                .unwrap();
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_already_posted_rejected() {
        let entry = make_entry(true);
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];

        assert!(matches!(
            JournalService::validate_for_posting(&entry, &lines, active_account, open_period),
            Err(LedgerError::AlreadyPosted(_))
        ));
    }

    #[test]
    fn test_single_line_rejected() {
        let entry = make_entry(false);
        let lines = vec![make_line(dec!(100.00), Decimal::ZERO)];

        assert!(matches!(
            JournalService::validate_for_posting(&entry, &lines, active_account, open_period),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_inactive_account_reported_as_unknown() {
        let entry = make_entry(false);
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];

        let inactive = |id: Uuid| -> Result<AccountInfo, LedgerError> {
            Ok(AccountInfo {
                id,
                code: "6010".to_string(),
                is_active: false,
            })
        };

        assert!(matches!(
            JournalService::validate_for_posting(&entry, &lines, inactive, open_period),
            Err(LedgerError::UnknownAccount(code)) if code == "6010"
        ));
    }

    #[test]
    fn test_unbalanced_rejected_before_period_check() {
        let entry = make_entry(false);
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(95.00)),
        ];

        // Period lookup would also fail, but balance is checked first
        let no_period = |_date: NaiveDate| -> Option<PeriodInfo> { None };

        assert!(matches!(
            JournalService::validate_for_posting(&entry, &lines, active_account, no_period),
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_no_covering_period_fails_closed() {
        let entry = make_entry(false);
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];

        let no_period = |_date: NaiveDate| -> Option<PeriodInfo> { None };

        assert!(matches!(
            JournalService::validate_for_posting(&entry, &lines, active_account, no_period),
            Err(LedgerError::NoFiscalPeriod(_))
        ));
    }

    #[test]
    fn test_closed_and_locked_periods_reject_posting() {
        for status in [FiscalPeriodStatus::Closed, FiscalPeriodStatus::Locked] {
            let gated = move |_date: NaiveDate| -> Option<PeriodInfo> {
                Some(PeriodInfo {
                    name: "2026-01".to_string(),
                    status,
                })
            };

            let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
            assert!(matches!(
                JournalService::check_period(date, &gated),
                Err(LedgerError::PeriodLocked { ref name, .. }) if name == "2026-01"
            ));
        }
    }

    #[test]
    fn test_posted_entries_are_immutable() {
        let entry = make_entry(true);
        assert!(matches!(
            JournalService::validate_can_modify(&entry),
            Err(LedgerError::ImmutableEntry(_))
        ));
        assert!(matches!(
            JournalService::validate_can_delete(&entry),
            Err(LedgerError::ImmutableEntry(_))
        ));
    }

    #[test]
    fn test_drafts_are_mutable() {
        let entry = make_entry(false);
        assert!(JournalService::validate_can_modify(&entry).is_ok());
        assert!(JournalService::validate_can_delete(&entry).is_ok());
    }
}
