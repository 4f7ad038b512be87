//! Read-only views over loans: headline summary, burn-down against the
//! original plan, and how the money paid so far splits between principal,
//! interest and part payments.
//!
//! All functions consume statements as stored and never re-derive them.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::emi::{installment_date, month_label, monthly_interest, round_money};
use crate::loan::Loan;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanTrackerResult;

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Output Types
// ---------------------------------------------------------------------------

/// Headline figures for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub principal: Money,
    pub interest_rate: Rate,
    /// Contractual tenure in months.
    pub tenure: u32,
    pub original_tenure: u32,
    pub original_emi: Money,
    /// Months the statement actually runs after part payments.
    pub realised_tenure: u32,
    pub start_month: String,
    /// Month of the last statement row.
    pub end_month: String,
    pub total_interest: Money,
    pub total_part_payments: Money,
    pub closing_balance: Money,
}

/// One point of the burn-down chart. Series are padded with `None` to the
/// longer of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnDownPoint {
    pub month: u32,
    pub label: String,
    pub actual_pending: Option<Money>,
    pub planned_pending: Option<Money>,
}

/// Percentages of some base, 2 dp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidShares {
    pub principal_pct: Decimal,
    pub interest_pct: Decimal,
    pub part_payment_pct: Decimal,
}

/// Totals paid across one or more statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidBreakdown {
    pub loans: usize,
    pub principal: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub part_payments: Money,
    pub total_paid: Money,
    /// Shares of `total_paid`.
    pub of_total_paid: PaidShares,
    /// Shares of `principal`.
    pub of_principal: PaidShares,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise a loan's terms and realised statement.
pub fn loan_summary(loan: &Loan) -> LoanTrackerResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let original_emi = loan.fixed_emi()?;
    let end_date = match loan.statement.last() {
        Some(row) => row.date,
        None => {
            warnings.push("Loan has no statement; end month derived from tenure".into());
            installment_date(loan.start_date, loan.tenure)?
        }
    };

    let closing_balance = loan.closing_balance();
    if !loan.statement.is_empty() && !closing_balance.is_zero() {
        warnings.push(format!(
            "Statement ends with {closing_balance} still pending"
        ));
    }

    let summary = LoanSummary {
        name: loan.name.clone(),
        principal: loan.principal,
        interest_rate: loan.interest_rate,
        tenure: loan.tenure,
        original_tenure: loan.original_tenure.unwrap_or(loan.tenure),
        original_emi,
        realised_tenure: loan.realised_tenure() as u32,
        start_month: month_label(loan.start_date),
        end_month: month_label(end_date),
        total_interest: loan.statement.iter().map(|r| r.interest_paid).sum(),
        total_part_payments: loan.statement.iter().map(|r| r.part_payment).sum(),
        closing_balance,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Realised statement summary (fixed EMI, whole-unit rounding)",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "interest_rate": loan.interest_rate.to_string(),
            "tenure": loan.tenure,
        }),
        warnings,
        elapsed,
        summary,
    ))
}

impl LoanSummary {
    /// One-line description for list views, e.g.
    /// `100000 @ 10% for 12m (Ends: Dec 2025)`.
    pub fn headline(&self) -> String {
        format!(
            "{} @ {}% for {}m (Ends: {})",
            self.principal,
            self.interest_rate.normalize(),
            self.tenure,
            self.end_month
        )
    }
}

/// Actual pending balance per month next to the original plan: the pinned
/// EMI at the loan rate with no part payments, for at most the original
/// tenure and stopping at payoff.
pub fn burn_down(loan: &Loan) -> LoanTrackerResult<Vec<BurnDownPoint>> {
    let emi = loan.fixed_emi()?;
    let plan_months = loan.original_tenure.unwrap_or(loan.tenure);

    let mut planned: Vec<Money> = Vec::with_capacity(plan_months as usize);
    let mut pending = loan.principal;
    for _ in 0..plan_months {
        let interest = monthly_interest(pending, loan.interest_rate);
        let principal_paid = (emi - interest).max(Decimal::ZERO);
        pending -= principal_paid;
        planned.push(round_money(pending).max(Decimal::ZERO));
        if pending <= Decimal::ZERO {
            break;
        }
    }

    let len = loan.statement.len().max(planned.len());
    let mut points = Vec::with_capacity(len);
    for i in 0..len {
        let actual = loan.statement.get(i);
        let label = match actual {
            Some(row) => row.label(),
            None => month_label(installment_date(loan.start_date, i as u32)?),
        };
        points.push(BurnDownPoint {
            month: i as u32 + 1,
            label,
            actual_pending: actual.map(|row| row.pending),
            planned_pending: planned.get(i).copied(),
        });
    }
    Ok(points)
}

/// What has been paid on one loan.
pub fn paid_breakdown(loan: &Loan) -> ComputationOutput<PaidBreakdown> {
    let start = Instant::now();
    let result = breakdown_of(std::slice::from_ref(loan));
    wrap_breakdown(start, result, 1)
}

/// What has been paid across every loan in `loans`.
pub fn portfolio_breakdown(loans: &[Loan]) -> ComputationOutput<PaidBreakdown> {
    let start = Instant::now();
    let result = breakdown_of(loans);
    wrap_breakdown(start, result, loans.len())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn breakdown_of(loans: &[Loan]) -> PaidBreakdown {
    let mut principal = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;
    let mut interest_paid = Decimal::ZERO;
    let mut part_payments = Decimal::ZERO;

    for loan in loans {
        principal += loan.principal;
        for row in &loan.statement {
            principal_paid += row.principal_paid;
            interest_paid += row.interest_paid;
            part_payments += row.part_payment;
        }
    }

    let total_paid = principal_paid + interest_paid + part_payments;
    PaidBreakdown {
        loans: loans.len(),
        principal,
        principal_paid,
        interest_paid,
        part_payments,
        total_paid,
        of_total_paid: shares(principal_paid, interest_paid, part_payments, total_paid),
        of_principal: shares(principal_paid, interest_paid, part_payments, principal),
    }
}

fn shares(principal: Money, interest: Money, part: Money, base: Money) -> PaidShares {
    PaidShares {
        principal_pct: pct(principal, base),
        interest_pct: pct(interest, base),
        part_payment_pct: pct(part, base),
    }
}

/// Zero when the base is zero.
fn pct(part: Money, base: Money) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    (part / base * HUNDRED).round_dp(2)
}

fn wrap_breakdown(
    start: Instant,
    result: PaidBreakdown,
    loans: usize,
) -> ComputationOutput<PaidBreakdown> {
    let mut warnings = Vec::new();
    if loans == 0 {
        warnings.push("No loans on record".into());
    }
    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Sum of statement rows as stored",
        &serde_json::json!({ "loans": loans }),
        warnings,
        elapsed,
        result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{create_loan, set_part_payment, LoanInput};
    use chrono::NaiveDate;

    fn reference_loan() -> Loan {
        create_loan(&LoanInput {
            name: Some("Bike".into()),
            principal: dec!(100000),
            interest_rate: dec!(10),
            tenure: 12,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
        })
        .unwrap()
    }

    #[test]
    fn test_summary_headline() {
        let out = loan_summary(&reference_loan()).unwrap();
        let s = &out.result;
        assert_eq!(s.realised_tenure, 12);
        assert_eq!(s.original_emi, dec!(8792));
        assert_eq!(s.end_month, "Dec 2025");
        assert_eq!(s.headline(), "100000 @ 10% for 12m (Ends: Dec 2025)");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_summary_end_month_tracks_part_payments() {
        let mut loan = reference_loan();
        set_part_payment(&mut loan, 0, dec!(40000)).unwrap();
        let s = loan_summary(&loan).unwrap().result;
        assert!(s.realised_tenure < 12);
        assert_eq!(s.tenure, 12);
        assert_eq!(s.total_part_payments, dec!(40000));
        assert_ne!(s.end_month, "Dec 2025");
    }

    #[test]
    fn test_summary_without_statement_uses_tenure() {
        let mut loan = reference_loan();
        loan.statement.clear();
        let out = loan_summary(&loan).unwrap();
        assert_eq!(out.result.end_month, "Jan 2026");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_burn_down_pads_shorter_series() {
        let mut loan = reference_loan();
        set_part_payment(&mut loan, 0, dec!(40000)).unwrap();
        let points = burn_down(&loan).unwrap();
        let actual_len = loan.statement.len();

        assert!(points.len() >= 12);
        assert_eq!(points[0].actual_pending, Some(loan.statement[0].pending));
        assert!(points[actual_len].actual_pending.is_none());
        assert!(points[actual_len].planned_pending.is_some());
        assert_eq!(points[11].label, "Dec 2025");
    }

    #[test]
    fn test_breakdown_shares() {
        let loan = reference_loan();
        let b = paid_breakdown(&loan).result;
        assert_eq!(b.total_paid, b.principal_paid + b.interest_paid + b.part_payments);
        assert_eq!(b.part_payments, dec!(0));
        assert_eq!(b.of_total_paid.part_payment_pct, dec!(0));
        // whole principal repaid by a fresh schedule, within rounding
        assert!((b.of_principal.principal_pct - dec!(100)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_empty_portfolio_breakdown() {
        let out = portfolio_breakdown(&[]);
        assert_eq!(out.result.total_paid, dec!(0));
        assert_eq!(out.result.of_principal.principal_pct, dec!(0));
        assert_eq!(out.warnings, vec!["No loans on record".to_string()]);
    }
}
