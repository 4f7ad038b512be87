//! Fresh statement generation from loan terms.
//!
//! Each month re-derives the level-payment EMI from the balance still
//! outstanding and the months left, so a schedule with no overrides closes
//! on exactly the declared tenure.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::emi::{calc_emi, installment_date, monthly_interest, round_money};
use crate::loan::{LoanTerms, StatementRow};
use crate::LoanTrackerResult;

/// Build a full-length statement (one row per month of `terms.tenure`)
/// starting at `start_date`. Rows carry no part payments or rate overrides.
pub fn generate_statement(
    terms: &LoanTerms,
    start_date: NaiveDate,
) -> LoanTrackerResult<Vec<StatementRow>> {
    terms.validate()?;

    let rate = terms.interest_rate;
    let mut pending = terms.principal;
    let mut statement = Vec::with_capacity(terms.tenure as usize);

    for month in 1..=terms.tenure {
        let remaining = terms.tenure - month + 1;
        let emi = calc_emi(pending, rate, remaining)?;
        let interest_paid = monthly_interest(pending, rate);
        let principal_paid = emi - interest_paid;

        pending = round_money(pending - principal_paid).max(Decimal::ZERO);

        statement.push(StatementRow {
            month,
            date: installment_date(start_date, month - 1)?,
            interest_rate: rate,
            rate_override: None,
            emi,
            interest_paid,
            principal_paid,
            part_payment: Decimal::ZERO,
            pending,
        });
    }

    debug!(
        months = statement.len(),
        first_emi = %statement.first().map(|r| r.emi).unwrap_or_default(),
        closing = %pending,
        "statement generated"
    );
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanTrackerError;
    use crate::recalc::MAX_SCHEDULE_MONTHS;
    use rust_decimal_macros::dec;

    fn terms(principal: Decimal, rate: Decimal, tenure: u32) -> LoanTerms {
        LoanTerms {
            principal,
            interest_rate: rate,
            tenure,
        }
    }

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_reference_first_row() {
        let rows = generate_statement(&terms(dec!(100000), dec!(10), 12), jan_2025()).unwrap();
        assert_eq!(rows.len(), 12);
        let first = &rows[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.emi, dec!(8792));
        assert_eq!(first.interest_paid, dec!(833));
        assert_eq!(first.principal_paid, dec!(7959));
        assert_eq!(first.pending, dec!(92041));
        assert_eq!(first.label(), "Jan 2025");
        assert_eq!(rows[11].label(), "Dec 2025");
    }

    #[test]
    fn test_pending_non_increasing_and_closes() {
        let rows = generate_statement(&terms(dec!(250000), dec!(8.5), 36), jan_2025()).unwrap();
        for pair in rows.windows(2) {
            assert!(pair[1].pending <= pair[0].pending);
        }
        assert!(rows.last().unwrap().pending <= dec!(1));
    }

    #[test]
    fn test_zero_rate_divides_evenly() {
        let rows = generate_statement(&terms(dec!(12000), dec!(0), 12), jan_2025()).unwrap();
        assert!(rows.iter().all(|r| r.emi == dec!(1000)));
        assert!(rows.iter().all(|r| r.interest_paid == dec!(0)));
        assert_eq!(rows[10].pending, dec!(1000));
        assert_eq!(rows[11].pending, dec!(0));
    }

    #[test]
    fn test_single_month_tenure() {
        let rows = generate_statement(&terms(dec!(100000), dec!(12), 1), jan_2025()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].emi, dec!(101000));
        assert_eq!(rows[0].interest_paid, dec!(1000));
        assert_eq!(rows[0].pending, dec!(0));
    }

    #[test]
    fn test_rows_default_overrides() {
        let rows = generate_statement(&terms(dec!(50000), dec!(9), 6), jan_2025()).unwrap();
        assert!(rows.iter().all(|r| r.part_payment.is_zero() && r.rate_override.is_none()));
        assert!(rows.iter().all(|r| r.interest_rate == dec!(9)));
    }

    #[test]
    fn test_rejects_zero_tenure() {
        assert!(generate_statement(&terms(dec!(1000), dec!(5), 0), jan_2025()).is_err());
    }

    #[test]
    fn test_rejects_tenure_past_month_ceiling() {
        let err = generate_statement(&terms(dec!(1000), dec!(5), 5_000_000), jan_2025())
            .unwrap_err();
        assert!(matches!(
            err,
            LoanTrackerError::InvalidInput { ref field, .. } if field == "tenure"
        ));
        let rows =
            generate_statement(&terms(dec!(1000), dec!(5), MAX_SCHEDULE_MONTHS), jan_2025())
                .unwrap();
        assert_eq!(rows.len(), MAX_SCHEDULE_MONTHS as usize);
    }
}
