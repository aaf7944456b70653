//! Fiscal period status transitions and range rules.
//!
//! The status machine is small and strict:
//!
//! ```text
//! open --close--> closed --lock--> locked
//!                 closed --reopen--> open
//! ```
//!
//! `locked` is terminal. Everything else is `InvalidTransition`.

use chrono::NaiveDate;

use super::error::FiscalError;
use super::period::FiscalPeriodStatus;

/// Validates a status transition.
///
/// # Errors
///
/// Returns `FiscalError::InvalidTransition` for any edge not in the machine.
pub fn validate_transition(
    from: FiscalPeriodStatus,
    to: FiscalPeriodStatus,
) -> Result<(), FiscalError> {
    use FiscalPeriodStatus::{Closed, Locked, Open};

    match (from, to) {
        (Open, Closed) | (Closed, Locked) | (Closed, Open) => Ok(()),
        _ => Err(FiscalError::InvalidTransition { from, to }),
    }
}

/// Validates that a period's date range is well-formed.
///
/// # Errors
///
/// Returns `FiscalError::InvalidDateRange` when `start >= end`.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), FiscalError> {
    if start >= end {
        return Err(FiscalError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Validates that a candidate range does not overlap any existing period.
///
/// Ranges are inclusive on both ends, so two periods overlap exactly when
/// `a.start <= b.end && b.start <= a.end`.
///
/// # Errors
///
/// Returns `FiscalError::OverlappingPeriod` naming the first conflicting period.
pub fn validate_no_overlap<'a, I>(
    start: NaiveDate,
    end: NaiveDate,
    existing: I,
) -> Result<(), FiscalError>
where
    I: IntoIterator<Item = (&'a str, NaiveDate, NaiveDate)>,
{
    for (name, other_start, other_end) in existing {
        if start <= other_end && other_start <= end {
            return Err(FiscalError::OverlappingPeriod(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(FiscalPeriodStatus::Open, FiscalPeriodStatus::Closed, true)]
    #[case(FiscalPeriodStatus::Closed, FiscalPeriodStatus::Locked, true)]
    #[case(FiscalPeriodStatus::Closed, FiscalPeriodStatus::Open, true)]
    // locked is terminal
    #[case(FiscalPeriodStatus::Locked, FiscalPeriodStatus::Open, false)]
    #[case(FiscalPeriodStatus::Locked, FiscalPeriodStatus::Closed, false)]
    // open -> locked requires closing first
    #[case(FiscalPeriodStatus::Open, FiscalPeriodStatus::Locked, false)]
    fn test_transition_edges(
        #[case] from: FiscalPeriodStatus,
        #[case] to: FiscalPeriodStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }

    #[test]
    fn test_self_transitions_rejected() {
        use FiscalPeriodStatus::{Closed, Locked, Open};
        for status in [Open, Closed, Locked] {
            assert!(validate_transition(status, status).is_err());
        }
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(date(2026, 1, 1), date(2026, 1, 31)).is_ok());
        assert!(validate_date_range(date(2026, 1, 31), date(2026, 1, 1)).is_err());
        assert!(validate_date_range(date(2026, 1, 1), date(2026, 1, 1)).is_err());
    }

    #[test]
    fn test_overlap_detection() {
        let existing = [("2026-01", date(2026, 1, 1), date(2026, 1, 31))];

        // Disjoint ranges pass
        assert!(validate_no_overlap(date(2026, 2, 1), date(2026, 2, 28), existing).is_ok());

        // Sharing a single day fails (inclusive bounds)
        assert!(matches!(
            validate_no_overlap(date(2026, 1, 31), date(2026, 2, 28), existing),
            Err(FiscalError::OverlappingPeriod(name)) if name == "2026-01"
        ));

        // Fully contained fails
        assert!(validate_no_overlap(date(2026, 1, 10), date(2026, 1, 20), existing).is_err());

        // Fully containing fails
        assert!(validate_no_overlap(date(2025, 12, 1), date(2026, 2, 28), existing).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_date() -> impl Strategy<Value = NaiveDate> {
            (2020i32..2030, 1u32..=12, 1u32..=28)
                .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Property: overlap is symmetric.
            #[test]
            fn overlap_is_symmetric(a in (arb_date(), arb_date()), b in (arb_date(), arb_date())) {
                let (a_start, a_end) = (a.0.min(a.1), a.0.max(a.1));
                let (b_start, b_end) = (b.0.min(b.1), b.0.max(b.1));

                let ab = validate_no_overlap(a_start, a_end, [("b", b_start, b_end)]).is_err();
                let ba = validate_no_overlap(b_start, b_end, [("a", a_start, a_end)]).is_err();
                prop_assert_eq!(ab, ba);
            }

            /// Property: a range always overlaps itself.
            #[test]
            fn range_overlaps_itself(d in (arb_date(), arb_date())) {
                let (start, end) = (d.0.min(d.1), d.0.max(d.1));
                prop_assert!(validate_no_overlap(start, end, [("self", start, end)]).is_err());
            }
        }
    }
}
