//! Journal entry and line types.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{
    AccountId, JournalEntryId, JournalLineId, OrganizationId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A journal entry header.
///
/// `entry_number` is monotonic per organization and assigned at creation;
/// discarding a draft leaves a gap, numbers are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Organization this entry belongs to.
    pub organization_id: OrganizationId,
    /// Per-organization monotonic number.
    pub entry_number: i64,
    /// Accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Human-readable description.
    pub description: String,
    /// Whether the entry has been posted. Posted entries are immutable.
    pub posted: bool,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// If this entry is a reversal, the entry it reverses.
    pub reverses_entry_id: Option<JournalEntryId>,
    /// If this entry has been reversed, the reversing entry.
    pub reversed_by_entry_id: Option<JournalEntryId>,
    /// Who created the entry.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A journal line. Exactly one of `debit`/`credit` is non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: JournalLineId,
    /// Entry this line belongs to.
    pub entry_id: JournalEntryId,
    /// Account being debited or credited.
    pub account_id: AccountId,
    /// Position within the entry, 1-based.
    pub line_number: i32,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
    /// Optional cost center, opaque to the engine.
    pub cost_center_id: Option<Uuid>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Input for adding a line to a draft entry.
///
/// The account is addressed by code; resolution to an active account happens
/// eagerly and again inside the posting transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLine {
    /// Account code (e.g., "1000").
    pub account_code: String,
    /// Debit amount; mutually exclusive with `credit`.
    pub debit: Option<Decimal>,
    /// Credit amount; mutually exclusive with `debit`.
    pub credit: Option<Decimal>,
    /// Optional cost center.
    pub cost_center_id: Option<Uuid>,
    /// Optional memo.
    pub memo: Option<String>,
}

/// Debit and credit totals for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of all debit amounts.
    pub debit: Decimal,
    /// Sum of all credit amounts.
    pub credit: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Creates totals, computing the balanced flag with exact equality.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Signed difference (debit - credit). Zero when balanced.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_totals_balanced() {
        let totals = EntryTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_difference_is_signed() {
        let totals = EntryTotals::new(dec!(100.00), dec!(95.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(5.00));

        let totals = EntryTotals::new(dec!(95.00), dec!(100.00));
        assert_eq!(totals.difference(), dec!(-5.00));
    }

    #[test]
    fn test_exact_equality_not_rounding() {
        // 100.00 and 100.001 differ; no tolerance is applied
        let totals = EntryTotals::new(dec!(100.00), dec!(100.001));
        assert!(!totals.is_balanced);
    }
}
