//! Loan data model and the edit entry points a UI drives: create, term
//! edits, part payments and per-month rate overrides.
//!
//! Every entry point mutates the loan synchronously and leaves a fully
//! regenerated statement behind; persisting the result is the caller's job.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::emi::{calc_emi, first_of_month, month_label};
use crate::error::LoanTrackerError;
use crate::recalc::{recalc_statement, RecalcOutcome, MAX_SCHEDULE_MONTHS};
use crate::schedule::generate_statement;
use crate::types::{Money, Rate};
use crate::LoanTrackerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Highest annual rate accepted, in percent. Keeps the monthly rate below 1
/// so interest on any balance stays representable.
pub const MAX_ANNUAL_RATE: Rate = dec!(1000);

/// The contractual terms of a loan, the part a term edit may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual percentage rate (10 = 10% p.a.).
    pub interest_rate: Rate,
    /// Term in months.
    pub tenure: u32,
}

/// Input for creating a new loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub principal: Money,
    pub interest_rate: Rate,
    pub tenure: u32,
    /// Month of the first installment. Any day is accepted and normalised to
    /// the 1st; defaults to the current month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// One month of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// 1-based month number.
    pub month: u32,
    /// First day of the installment month.
    pub date: NaiveDate,
    /// Annual rate applied this month.
    pub interest_rate: Rate,
    /// User-entered rate for this month only; `None` follows the loan rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_override: Option<Rate>,
    pub emi: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    /// Extra principal-only payment made this month.
    #[serde(default)]
    pub part_payment: Money,
    /// Principal outstanding after this month.
    pub pending: Money,
}

/// A tracked loan with its realised statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub principal: Money,
    pub interest_rate: Rate,
    /// Contractual tenure in months. Never rewritten by recalculation.
    pub tenure: u32,
    pub start_date: NaiveDate,
    /// Tenure when the loan was first set up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tenure: Option<u32>,
    /// EMI pinned for every recalculation once captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_emi: Option<Money>,
    #[serde(default)]
    pub statement: Vec<StatementRow>,
}

// ---------------------------------------------------------------------------
// Impls
// ---------------------------------------------------------------------------

impl LoanTerms {
    pub fn validate(&self) -> LoanTrackerResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanTrackerError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        validate_rate(self.interest_rate)?;
        if self.tenure == 0 {
            return Err(LoanTrackerError::InvalidInput {
                field: "tenure".into(),
                reason: "Tenure must be at least 1 month".into(),
            });
        }
        if self.tenure > MAX_SCHEDULE_MONTHS {
            return Err(LoanTrackerError::InvalidInput {
                field: "tenure".into(),
                reason: format!("Tenure cannot exceed {MAX_SCHEDULE_MONTHS} months"),
            });
        }
        Ok(())
    }
}

fn validate_rate(rate: Rate) -> LoanTrackerResult<()> {
    if rate < Decimal::ZERO {
        return Err(LoanTrackerError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if rate > MAX_ANNUAL_RATE {
        return Err(LoanTrackerError::InvalidInput {
            field: "interest_rate".into(),
            reason: format!("Interest rate cannot exceed {MAX_ANNUAL_RATE}%"),
        });
    }
    Ok(())
}

impl LoanInput {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
        }
    }
}

impl StatementRow {
    /// Month label, e.g. `Mar 2025`.
    pub fn label(&self) -> String {
        month_label(self.date)
    }

    /// Values in export column order:
    /// Month, Date, EMI, PrincipalPaid, InterestPaid, PartPayment, InterestRate, Pending.
    pub fn export_record(&self) -> [String; 8] {
        [
            self.month.to_string(),
            self.label(),
            self.emi.to_string(),
            self.principal_paid.to_string(),
            self.interest_paid.to_string(),
            self.part_payment.to_string(),
            self.interest_rate.normalize().to_string(),
            self.pending.to_string(),
        ]
    }
}

/// Header row matching [`StatementRow::export_record`].
pub const EXPORT_HEADERS: [&str; 8] = [
    "Month",
    "Date",
    "EMI",
    "PrincipalPaid",
    "InterestPaid",
    "PartPayment",
    "InterestRate",
    "Pending",
];

impl Loan {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
        }
    }

    /// The EMI every recalculation is pinned to. Loans saved before the
    /// baseline existed fall back to the EMI implied by their current terms.
    pub fn fixed_emi(&self) -> LoanTrackerResult<Money> {
        match self.original_emi {
            Some(emi) => Ok(emi),
            None => calc_emi(self.principal, self.interest_rate, self.tenure),
        }
    }

    /// Months the loan actually runs for after part payments.
    pub fn realised_tenure(&self) -> usize {
        self.statement.len()
    }

    /// Balance left after the last statement row.
    pub fn closing_balance(&self) -> Money {
        self.statement
            .last()
            .map(|row| row.pending)
            .unwrap_or(self.principal)
    }

    /// Capture `original_tenure` / `original_emi` from the current terms if
    /// they were never set. Existing baselines are left untouched.
    fn snapshot_baseline(&mut self) -> LoanTrackerResult<()> {
        if self.original_tenure.is_none() {
            self.original_tenure = Some(self.tenure);
        }
        if self.original_emi.is_none() {
            self.original_emi = Some(calc_emi(self.principal, self.interest_rate, self.tenure)?);
        }
        Ok(())
    }

    /// Regenerate a missing statement from the loan's terms. Returns whether
    /// anything was rebuilt.
    pub fn ensure_statement(&mut self) -> LoanTrackerResult<bool> {
        if !self.statement.is_empty() {
            return Ok(false);
        }
        self.statement = generate_statement(&self.terms(), self.start_date)?;
        Ok(true)
    }

    fn row_mut(&mut self, month_index: usize) -> LoanTrackerResult<&mut StatementRow> {
        let len = self.statement.len();
        self.statement
            .get_mut(month_index)
            .ok_or(LoanTrackerError::MonthOutOfRange {
                index: month_index,
                len,
            })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Create a loan with a freshly generated statement and its EMI baseline.
pub fn create_loan(input: &LoanInput) -> LoanTrackerResult<Loan> {
    let terms = input.terms();
    terms.validate()?;

    let start_date = first_of_month(input.start_date.unwrap_or_else(|| Local::now().date_naive()))?;
    let statement = generate_statement(&terms, start_date)?;

    let mut loan = Loan {
        name: input.name.clone(),
        principal: terms.principal,
        interest_rate: terms.interest_rate,
        tenure: terms.tenure,
        start_date,
        original_tenure: None,
        original_emi: None,
        statement,
    };
    loan.snapshot_baseline()?;

    info!(
        principal = %loan.principal,
        rate = %loan.interest_rate,
        tenure = loan.tenure,
        start = %month_label(start_date),
        "loan created"
    );
    Ok(loan)
}

/// Apply new principal / rate / tenure.
///
/// The statement is regenerated for the new terms, then the part payments
/// and rate overrides of the overlapping months are carried across and the
/// schedule is replayed against the pinned EMI. Overrides beyond the shorter
/// of the two schedules are dropped. Returns `None` when nothing changed.
pub fn edit_loan_terms(
    loan: &mut Loan,
    new_terms: &LoanTerms,
) -> LoanTrackerResult<Option<RecalcOutcome>> {
    new_terms.validate()?;
    if loan.terms() == *new_terms {
        return Ok(None);
    }

    let mut statement = generate_statement(new_terms, loan.start_date)?;
    for (row, old) in statement.iter_mut().zip(loan.statement.iter()) {
        row.part_payment = old.part_payment;
        row.rate_override = old.rate_override;
    }
    let carried = loan.statement.len().min(statement.len());

    loan.snapshot_baseline()?;
    loan.principal = new_terms.principal;
    loan.interest_rate = new_terms.interest_rate;
    loan.tenure = new_terms.tenure;
    loan.statement = statement;

    let mut outcome = recalc_statement(loan)?;

    let implied_emi = calc_emi(loan.principal, loan.interest_rate, loan.tenure)?;
    if implied_emi != outcome.fixed_emi {
        outcome.warnings.push(format!(
            "EMI stays at the original {}; the new terms alone would imply {}",
            outcome.fixed_emi, implied_emi
        ));
    }

    debug!(
        carried,
        months = loan.statement.len(),
        "loan terms edited"
    );
    Ok(Some(outcome))
}

/// Record a part payment for `month_index` (0-based) and replay the schedule.
pub fn set_part_payment(
    loan: &mut Loan,
    month_index: usize,
    amount: Money,
) -> LoanTrackerResult<RecalcOutcome> {
    if amount < Decimal::ZERO {
        return Err(LoanTrackerError::InvalidInput {
            field: "part_payment".into(),
            reason: "Part payment cannot be negative".into(),
        });
    }
    loan.row_mut(month_index)?.part_payment = amount;
    recalc_statement(loan)
}

/// Override the annual rate for `month_index` (0-based) only, or clear the
/// override with `None` so the month follows the loan rate again.
pub fn set_monthly_rate(
    loan: &mut Loan,
    month_index: usize,
    rate: Option<Rate>,
) -> LoanTrackerResult<RecalcOutcome> {
    if let Some(r) = rate {
        validate_rate(r)?;
    }
    loan.row_mut(month_index)?.rate_override = rate;
    recalc_statement(loan)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn reference_input() -> LoanInput {
        LoanInput {
            name: Some("Car".into()),
            principal: dec!(100000),
            interest_rate: dec!(10),
            tenure: 12,
            start_date: Some(jan_2025()),
        }
    }

    #[test]
    fn test_create_loan_sets_baseline() {
        let loan = create_loan(&reference_input()).unwrap();
        assert_eq!(loan.original_tenure, Some(12));
        assert_eq!(loan.original_emi, Some(dec!(8792)));
        assert_eq!(loan.statement.len(), 12);
        assert_eq!(loan.statement[0].emi, dec!(8792));
    }

    #[test]
    fn test_create_loan_normalises_start_day() {
        let mut input = reference_input();
        input.start_date = NaiveDate::from_ymd_opt(2025, 3, 17);
        let loan = create_loan(&input).unwrap();
        assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(loan.statement[0].label(), "Mar 2025");
    }

    #[test]
    fn test_create_loan_rejects_zero_principal() {
        let mut input = reference_input();
        input.principal = dec!(0);
        let err = create_loan(&input).unwrap_err();
        assert!(matches!(
            err,
            LoanTrackerError::InvalidInput { ref field, .. } if field == "principal"
        ));
    }

    #[test]
    fn test_edit_unchanged_terms_is_noop() {
        let mut loan = create_loan(&reference_input()).unwrap();
        let before = loan.clone();
        let outcome = edit_loan_terms(&mut loan, &before.terms()).unwrap();
        assert!(outcome.is_none());
        assert_eq!(loan, before);
    }

    #[test]
    fn test_edit_keeps_existing_baseline() {
        let mut loan = create_loan(&reference_input()).unwrap();
        let terms = LoanTerms {
            principal: dec!(150000),
            interest_rate: dec!(10),
            tenure: 12,
        };
        let outcome = edit_loan_terms(&mut loan, &terms).unwrap().unwrap();
        assert_eq!(loan.original_emi, Some(dec!(8792)));
        assert_eq!(loan.original_tenure, Some(12));
        assert_eq!(loan.tenure, 12);
        assert_eq!(outcome.fixed_emi, dec!(8792));
        assert!(outcome.warnings.iter().any(|w| w.contains("EMI stays")));
    }

    #[test]
    fn test_edit_snapshots_baseline_for_legacy_loan() {
        let mut loan = create_loan(&reference_input()).unwrap();
        loan.original_emi = None;
        loan.original_tenure = None;
        let terms = LoanTerms {
            principal: dec!(100000),
            interest_rate: dec!(10),
            tenure: 24,
        };
        edit_loan_terms(&mut loan, &terms).unwrap();
        // baseline taken from the terms in force before the edit
        assert_eq!(loan.original_tenure, Some(12));
        assert_eq!(loan.original_emi, Some(dec!(8792)));
    }

    #[test]
    fn test_set_part_payment_out_of_range() {
        let mut loan = create_loan(&reference_input()).unwrap();
        let err = set_part_payment(&mut loan, 12, dec!(100)).unwrap_err();
        assert!(matches!(
            err,
            LoanTrackerError::MonthOutOfRange { index: 12, len: 12 }
        ));
    }

    #[test]
    fn test_set_part_payment_rejects_negative() {
        let mut loan = create_loan(&reference_input()).unwrap();
        assert!(set_part_payment(&mut loan, 0, dec!(-1)).is_err());
        assert_eq!(loan.statement[0].part_payment, dec!(0));
    }

    #[test]
    fn test_set_monthly_rate_rejects_extreme_rate() {
        let mut loan = create_loan(&reference_input()).unwrap();
        let before = loan.clone();
        let err = set_monthly_rate(&mut loan, 0, Some(Decimal::from_i128_with_scale(10_i128.pow(27), 0))).unwrap_err();
        assert!(matches!(
            err,
            LoanTrackerError::InvalidInput { ref field, .. } if field == "interest_rate"
        ));
        assert_eq!(loan, before);
        // the bound itself is accepted
        set_monthly_rate(&mut loan, 0, Some(MAX_ANNUAL_RATE)).unwrap();
    }

    #[test]
    fn test_create_loan_rejects_extreme_rate() {
        let mut input = reference_input();
        input.interest_rate = dec!(1001);
        assert!(create_loan(&input).is_err());
    }

    #[test]
    fn test_clearing_rate_override_restores_loan_rate() {
        let mut loan = create_loan(&reference_input()).unwrap();
        set_monthly_rate(&mut loan, 2, Some(dec!(14))).unwrap();
        assert_eq!(loan.statement[2].interest_rate, dec!(14));
        set_monthly_rate(&mut loan, 2, None).unwrap();
        assert_eq!(loan.statement[2].interest_rate, dec!(10));
        assert_eq!(loan.statement[2].rate_override, None);
    }

    #[test]
    fn test_export_record_columns() {
        let loan = create_loan(&reference_input()).unwrap();
        let record = loan.statement[0].export_record();
        assert_eq!(
            record,
            [
                "1".to_string(),
                "Jan 2025".to_string(),
                "8792".to_string(),
                "7959".to_string(),
                "833".to_string(),
                "0".to_string(),
                "10".to_string(),
                "92041".to_string(),
            ]
        );
    }

    #[test]
    fn test_ensure_statement_rebuilds_empty() {
        let mut loan = create_loan(&reference_input()).unwrap();
        loan.statement.clear();
        assert!(loan.ensure_statement().unwrap());
        assert_eq!(loan.statement.len(), 12);
        assert!(!loan.ensure_statement().unwrap());
    }
}
