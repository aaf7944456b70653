//! Reversal planning: the inverse entry that negates a posted entry.
//!
//! A reversal never touches the original's lines. It is a new posted entry
//! whose lines are the exact debit/credit swap, linked bidirectionally.

use chrono::NaiveDate;
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::service::{JournalService, PeriodInfo};
use super::types::{JournalEntry, JournalLine};

/// A line of a planned reversal entry, not yet persisted.
#[derive(Debug, Clone)]
pub struct PlannedLine {
    /// Account being debited or credited.
    pub account_id: AccountId,
    /// Position within the entry, mirrors the original line.
    pub line_number: i32,
    /// Debit amount (the original line's credit).
    pub debit: Decimal,
    /// Credit amount (the original line's debit).
    pub credit: Decimal,
    /// Carried over from the original line.
    pub cost_center_id: Option<Uuid>,
    /// Carried over from the original line.
    pub memo: Option<String>,
}

/// A validated reversal, ready to persist as a posted entry.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    /// Description of the reversal entry.
    pub description: String,
    /// Accounting date of the reversal entry.
    pub reversal_date: NaiveDate,
    /// Swapped lines.
    pub lines: Vec<PlannedLine>,
}

/// Plans the reversal of a posted entry.
///
/// Guards, in order: the original is posted (`NotPosted`), not already
/// reversed (`AlreadyReversed`), the reversal date is on/after the original
/// date (`ReversalPredatesOriginal`), and the reversal date passes the same
/// period lock check as any posting.
///
/// # Errors
///
/// Returns `LedgerError` naming the first failed guard.
pub fn plan_reversal<P>(
    original: &JournalEntry,
    lines: &[JournalLine],
    reversal_date: NaiveDate,
    reason: &str,
    period_lookup: P,
) -> Result<ReversalPlan, LedgerError>
where
    P: Fn(NaiveDate) -> Option<PeriodInfo>,
{
    if !original.posted {
        return Err(LedgerError::NotPosted(original.id.into_inner()));
    }
    if original.reversed_by_entry_id.is_some() {
        return Err(LedgerError::AlreadyReversed(original.id.into_inner()));
    }
    if reversal_date < original.entry_date {
        return Err(LedgerError::ReversalPredatesOriginal {
            entry_date: original.entry_date,
            reversal_date,
        });
    }

    JournalService::check_period(reversal_date, &period_lookup)?;

    let swapped = lines
        .iter()
        .map(|line| PlannedLine {
            account_id: line.account_id,
            line_number: line.line_number,
            debit: line.credit,
            credit: line.debit,
            cost_center_id: line.cost_center_id,
            memo: line.memo.clone(),
        })
        .collect();

    Ok(ReversalPlan {
        description: format!(
            "Reversal of entry #{}: {reason}",
            original.entry_number
        ),
        reversal_date,
        lines: swapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerline_shared::types::{
        JournalEntryId, JournalLineId, OrganizationId, UserId,
    };
    use rust_decimal_macros::dec;

    use crate::fiscal::FiscalPeriodStatus;

    fn make_posted_entry() -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            organization_id: OrganizationId::new(),
            entry_number: 42,
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Office supplies".to_string(),
            posted: true,
            posted_at: Some(Utc::now()),
            reverses_entry_id: None,
            reversed_by_entry_id: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_line(line_number: i32, debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            entry_id: JournalEntryId::new(),
            account_id: AccountId::new(),
            line_number,
            debit,
            credit,
            cost_center_id: None,
            memo: Some("original memo".to_string()),
        }
    }

    fn open_period(_date: NaiveDate) -> Option<PeriodInfo> {
        Some(PeriodInfo {
            name: "2026-01".to_string(),
            status: FiscalPeriodStatus::Open,
        })
    }

    #[test]
    fn test_reversal_swaps_sides() {
        let entry = make_posted_entry();
        let lines = vec![
            make_line(1, dec!(100.00), Decimal::ZERO),
            make_line(2, Decimal::ZERO, dec!(100.00)),
        ];

        let plan = plan_reversal(&entry, &lines, entry.entry_date, "duplicate", open_period)
            .unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].debit, Decimal::ZERO);
        assert_eq!(plan.lines[0].credit, dec!(100.00));
        assert_eq!(plan.lines[1].debit, dec!(100.00));
        assert_eq!(plan.lines[1].credit, Decimal::ZERO);
        assert_eq!(plan.description, "Reversal of entry #42: duplicate");
    }

    #[test]
    fn test_reversal_preserves_line_metadata() {
        let entry = make_posted_entry();
        let mut line = make_line(1, dec!(50.00), Decimal::ZERO);
        line.cost_center_id = Some(Uuid::new_v4());
        let lines = vec![line.clone(), make_line(2, Decimal::ZERO, dec!(50.00))];

        let plan =
            plan_reversal(&entry, &lines, entry.entry_date, "posted twice", open_period).unwrap();

        assert_eq!(plan.lines[0].account_id, line.account_id);
        assert_eq!(plan.lines[0].cost_center_id, line.cost_center_id);
        assert_eq!(plan.lines[0].memo, line.memo);
        assert_eq!(plan.lines[0].line_number, 1);
    }

    #[test]
    fn test_unposted_entry_cannot_be_reversed() {
        let mut entry = make_posted_entry();
        entry.posted = false;
        let lines = vec![make_line(1, dec!(10.00), Decimal::ZERO)];

        assert!(matches!(
            plan_reversal(&entry, &lines, entry.entry_date, "x", open_period),
            Err(LedgerError::NotPosted(_))
        ));
    }

    #[test]
    fn test_double_reverse_rejected() {
        let mut entry = make_posted_entry();
        entry.reversed_by_entry_id = Some(JournalEntryId::new());
        let lines = vec![make_line(1, dec!(10.00), Decimal::ZERO)];

        assert!(matches!(
            plan_reversal(&entry, &lines, entry.entry_date, "x", open_period),
            Err(LedgerError::AlreadyReversed(_))
        ));
    }

    #[test]
    fn test_reversal_cannot_predate_original() {
        let entry = make_posted_entry();
        let lines = vec![make_line(1, dec!(10.00), Decimal::ZERO)];
        let earlier = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();

        assert!(matches!(
            plan_reversal(&entry, &lines, earlier, "x", open_period),
            Err(LedgerError::ReversalPredatesOriginal { .. })
        ));
    }

    #[test]
    fn test_reversal_date_is_period_gated() {
        let entry = make_posted_entry();
        let lines = vec![
            make_line(1, dec!(10.00), Decimal::ZERO),
            make_line(2, Decimal::ZERO, dec!(10.00)),
        ];

        let locked = |_date: NaiveDate| -> Option<PeriodInfo> {
            Some(PeriodInfo {
                name: "2026-01".to_string(),
                status: FiscalPeriodStatus::Locked,
            })
        };

        assert!(matches!(
            plan_reversal(&entry, &lines, entry.entry_date, "x", locked),
            Err(LedgerError::PeriodLocked { .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use rust_decimal::Decimal;

        fn arb_amount() -> impl Strategy<Value = Decimal> {
            (1i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        /// A line that is either a debit or a credit of a random cent amount.
        fn arb_line(line_number: i32) -> impl Strategy<Value = JournalLine> {
            (arb_amount(), proptest::bool::ANY).prop_map(move |(amount, is_debit)| {
                let (debit, credit) = if is_debit {
                    (amount, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, amount)
                };
                make_line(line_number, debit, credit)
            })
        }

        fn arb_lines() -> impl Strategy<Value = Vec<JournalLine>> {
            proptest::collection::vec(arb_line(1), 2..=10).prop_map(|mut lines| {
                for (i, line) in lines.iter_mut().enumerate() {
                    line.line_number = i32::try_from(i).unwrap_or(i32::MAX) + 1;
                }
                lines
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Property: original plus reversal nets to zero on every line.
            #[test]
            fn reversal_nets_to_zero(lines in arb_lines()) {
                let entry = make_posted_entry();
                let plan = plan_reversal(&entry, &lines, entry.entry_date, "prop", open_period)
                    .unwrap();

                for (original, swapped) in lines.iter().zip(&plan.lines) {
                    prop_assert_eq!(original.debit - swapped.credit, Decimal::ZERO);
                    prop_assert_eq!(original.credit - swapped.debit, Decimal::ZERO);
                }
            }

            /// Property: a reversal of a balanced entry is itself balanced.
            #[test]
            fn reversal_of_balanced_is_balanced(debits in proptest::collection::vec(arb_amount(), 1..=5)) {
                let total: Decimal = debits.iter().copied().sum();
                let mut lines: Vec<JournalLine> = debits
                    .iter()
                    .enumerate()
                    .map(|(i, &d)| make_line(i32::try_from(i).unwrap_or(i32::MAX) + 1, d, Decimal::ZERO))
                    .collect();
                lines.push(make_line(
                    i32::try_from(lines.len()).unwrap_or(i32::MAX) + 1,
                    Decimal::ZERO,
                    total,
                ));

                let entry = make_posted_entry();
                let plan = plan_reversal(&entry, &lines, entry.entry_date, "prop", open_period)
                    .unwrap();

                let debit: Decimal = plan.lines.iter().map(|l| l.debit).sum();
                let credit: Decimal = plan.lines.iter().map(|l| l.credit).sum();
                prop_assert_eq!(debit, credit);
            }
        }
    }
}
