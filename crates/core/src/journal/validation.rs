//! Line-shape and balance validation.
//!
//! Amounts are `rust_decimal::Decimal`, compared with exact equality.
//! Balance means `sum(debit) == sum(credit)` to the last digit.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryTotals, JournalLine};

/// Maximum fractional digits an amount may carry (minor-unit precision).
const MAX_SCALE: u32 = 2;

/// Validates the debit/credit pair of a single line as given by the caller.
///
/// Missing sides are treated as zero. Returns the normalized `(debit, credit)`
/// pair on success.
///
/// # Errors
///
/// - `NegativeAmount` if either side is negative
/// - `BothSides` if both sides are non-zero
/// - `ZeroAmount` if neither side is non-zero
/// - `InvalidPrecision` if the amount has more than two fractional digits
pub fn validate_amounts(
    debit: Option<Decimal>,
    credit: Option<Decimal>,
) -> Result<(Decimal, Decimal), LedgerError> {
    let debit = debit.unwrap_or(Decimal::ZERO);
    let credit = credit.unwrap_or(Decimal::ZERO);

    if debit.is_sign_negative() || credit.is_sign_negative() {
        return Err(LedgerError::NegativeAmount);
    }
    if !debit.is_zero() && !credit.is_zero() {
        return Err(LedgerError::BothSides);
    }
    if debit.is_zero() && credit.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }

    let amount = if debit.is_zero() { credit } else { debit };
    if amount.normalize().scale() > MAX_SCALE {
        return Err(LedgerError::InvalidPrecision(amount));
    }

    Ok((debit, credit))
}

/// Sums the debit and credit sides of a set of lines.
#[must_use]
pub fn calculate_totals(lines: &[JournalLine]) -> EntryTotals {
    let debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let credit: Decimal = lines.iter().map(|l| l.credit).sum();
    EntryTotals::new(debit, credit)
}

/// Validates that a set of persisted lines can post.
///
/// # Errors
///
/// - `InsufficientLines` if there are fewer than 2 lines
/// - line-shape errors per [`validate_amounts`]
/// - `UnbalancedEntry` carrying both totals and the signed difference
pub fn validate_balanced(lines: &[JournalLine]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    for line in lines {
        validate_amounts(Some(line.debit), Some(line.credit))?;
    }

    let totals = calculate_totals(lines);
    if !totals.is_balanced {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.debit,
            credit: totals.credit,
            difference: totals.difference(),
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_shared::types::{AccountId, JournalEntryId, JournalLineId};
    use rust_decimal_macros::dec;

    pub(super) fn make_line(debit: Decimal, credit: Decimal) -> JournalLine {
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

    #[test]
    fn test_validate_amounts_accepts_one_side() {
        assert_eq!(
            validate_amounts(Some(dec!(100.00)), None).unwrap(),
            (dec!(100.00), Decimal::ZERO)
        );
        assert_eq!(
            validate_amounts(None, Some(dec!(42.50))).unwrap(),
            (Decimal::ZERO, dec!(42.50))
        );
    }

    #[test]
    fn test_validate_amounts_rejects_both_sides() {
        assert!(matches!(
            validate_amounts(Some(dec!(10)), Some(dec!(10))),
            Err(LedgerError::BothSides)
        ));
    }

    #[test]
    fn test_validate_amounts_rejects_zero() {
        assert!(matches!(
            validate_amounts(None, None),
            Err(LedgerError::ZeroAmount)
        ));
        assert!(matches!(
            validate_amounts(Some(Decimal::ZERO), Some(Decimal::ZERO)),
            Err(LedgerError::ZeroAmount)
        ));
    }

    #[test]
    fn test_validate_amounts_rejects_negative() {
        assert!(matches!(
            validate_amounts(Some(dec!(-10)), None),
            Err(LedgerError::NegativeAmount)
        ));
        assert!(matches!(
            validate_amounts(None, Some(dec!(-0.01))),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_validate_amounts_rejects_sub_cent_precision() {
        assert!(matches!(
            validate_amounts(Some(dec!(10.001)), None),
            Err(LedgerError::InvalidPrecision(_))
        ));
        // Trailing zeros beyond two places are fine after normalization
        assert!(validate_amounts(Some(dec!(10.0100)), None).is_ok());
    }

    #[test]
    fn test_balanced_lines_pass() {
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];
        let totals = validate_balanced(&lines).unwrap();
        assert!(totals.is_balanced);
        assert_eq!(totals.debit, dec!(100.00));
    }

    #[test]
    fn test_unbalanced_lines_report_difference() {
        let lines = vec![
            make_line(dec!(100.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(95.00)),
        ];
        match validate_balanced(&lines) {
            Err(LedgerError::UnbalancedEntry {
                debit,
                credit,
                difference,
            }) => {
                assert_eq!(debit, dec!(100.00));
                assert_eq!(credit, dec!(95.00));
                assert_eq!(difference, dec!(5.00));
            }
            other => panic!("expected UnbalancedEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_single_line_never_posts() {
        let lines = vec![make_line(dec!(100.00), Decimal::ZERO)];
        assert!(matches!(
            validate_balanced(&lines),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_empty_lines_never_post() {
        assert!(matches!(
            validate_balanced(&[]),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_multi_line_split_balances() {
        let lines = vec![
            make_line(dec!(60.00), Decimal::ZERO),
            make_line(dec!(40.00), Decimal::ZERO),
            make_line(Decimal::ZERO, dec!(100.00)),
        ];
        assert!(validate_balanced(&lines).is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Cent amounts in [0.01, 10_000.00].
        fn arb_amount() -> impl Strategy<Value = Decimal> {
            (1i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        fn arb_amounts(len: usize) -> impl Strategy<Value = Vec<Decimal>> {
            proptest::collection::vec(arb_amount(), 1..=len)
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Property: any debit set mirrored by a credit of the same total passes.
            #[test]
            fn mirrored_totals_always_balance(debits in arb_amounts(8)) {
                let total: Decimal = debits.iter().copied().sum();
                let mut lines: Vec<JournalLine> = debits
                    .iter()
                    .map(|&d| make_line(d, Decimal::ZERO))
                    .collect();
                lines.push(make_line(Decimal::ZERO, total));

                prop_assert!(validate_balanced(&lines).is_ok());
            }

            /// Property: perturbing the credit side by any non-zero cent amount fails.
            #[test]
            fn perturbed_totals_never_balance(
                debits in arb_amounts(8),
                delta_cents in 1i64..=10_000,
            ) {
                let total: Decimal = debits.iter().copied().sum();
                let perturbed = total + Decimal::new(delta_cents, 2);
                let mut lines: Vec<JournalLine> = debits
                    .iter()
                    .map(|&d| make_line(d, Decimal::ZERO))
                    .collect();
                lines.push(make_line(Decimal::ZERO, perturbed));

                let unbalanced = matches!(
                    validate_balanced(&lines),
                    Err(LedgerError::UnbalancedEntry { .. })
                );
                prop_assert!(unbalanced);
            }

            /// Property: reported difference equals debit total minus credit total.
            #[test]
            fn difference_is_exact(debit in arb_amount(), credit in arb_amount()) {
                let lines = vec![
                    make_line(debit, Decimal::ZERO),
                    make_line(Decimal::ZERO, credit),
                ];
                match validate_balanced(&lines) {
                    Ok(totals) => prop_assert_eq!(totals.difference(), Decimal::ZERO),
                    Err(LedgerError::UnbalancedEntry { difference, .. }) => {
                        prop_assert_eq!(difference, debit - credit);
                    }
                    Err(other) => return Err(TestCaseError::fail(format!("{other:?}"))),
                }
            }
        }
    }
}
