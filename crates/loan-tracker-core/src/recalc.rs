//! Replays a loan's statement against its pinned EMI.
//!
//! Part payments and per-month rate overrides are the only row values that
//! survive a replay; dates, interest, principal, EMI and balances are all
//! recomputed from `loan.principal` forward. A part payment therefore
//! shortens the schedule rather than lowering later installments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::emi::{installment_date, monthly_interest, round_money};
use crate::loan::{Loan, StatementRow};
use crate::types::Money;
use crate::LoanTrackerResult;

/// Hard ceiling on statement length. A schedule that has not paid off by
/// then is truncated.
pub const MAX_SCHEDULE_MONTHS: u32 = 600;

/// Balances at or below this are treated as paid off.
const PAYOFF_TOLERANCE: Decimal = dec!(0.5);

/// Summary of one replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcOutcome {
    /// Rows in the regenerated statement.
    pub months: u32,
    /// EMI the replay was pinned to.
    pub fixed_emi: Money,
    /// Balance after the last row; non-zero only when the ceiling was hit.
    pub closing_balance: Money,
    /// Data-quality signals for the caller. Never fatal.
    pub warnings: Vec<String>,
}

/// Regenerate `loan.statement` in place.
///
/// For each month the row's own rate override applies if present, the
/// pinned EMI is split into interest and principal, and the stored part
/// payment is drawn off the balance. In the month a payment would overshoot
/// zero, principal and EMI are cut so the balance closes exactly.
///
/// If the pinned EMI does not cover a month's interest (a sharp rate
/// override), principal paid is held at zero for that month: the balance
/// does not grow, the uncovered interest is not capitalised, and a warning
/// names the month.
pub fn recalc_statement(loan: &mut Loan) -> LoanTrackerResult<RecalcOutcome> {
    let fixed_emi = loan.fixed_emi()?;
    let mut warnings = Vec::new();
    let mut rows: Vec<StatementRow> = Vec::with_capacity(loan.statement.len());
    let mut pending = loan.principal;
    let mut month: u32 = 0;

    while pending > PAYOFF_TOLERANCE && month < MAX_SCHEDULE_MONTHS {
        let (part_payment, rate_override) = loan
            .statement
            .get(month as usize)
            .map(|row| (row.part_payment, row.rate_override))
            .unwrap_or((Decimal::ZERO, None));
        let rate = rate_override.unwrap_or(loan.interest_rate);

        let interest_due = monthly_interest(pending, rate);
        let mut emi = fixed_emi;
        let shortfall = (interest_due - emi).max(Decimal::ZERO);
        let mut interest_paid = interest_due - shortfall;
        let mut principal_paid = (emi - interest_due).max(Decimal::ZERO);

        if pending - (principal_paid + part_payment) < -PAYOFF_TOLERANCE {
            // terminal month: stop the balance going below zero
            principal_paid = (pending - part_payment).max(Decimal::ZERO);
            interest_paid = interest_due;
            emi = principal_paid + interest_paid;
        } else if shortfall > Decimal::ZERO {
            warn!(month = month + 1, shortfall = %shortfall, "emi does not cover interest");
            warnings.push(format!(
                "Month {}: EMI {} does not cover interest {} at {}%; shortfall {} not amortised",
                month + 1,
                emi,
                interest_due,
                rate.normalize(),
                shortfall
            ));
        }

        pending = round_money(pending - (principal_paid + part_payment)).max(Decimal::ZERO);

        rows.push(StatementRow {
            month: month + 1,
            date: installment_date(loan.start_date, month)?,
            interest_rate: rate,
            rate_override,
            emi: round_money(emi).max(Decimal::ZERO),
            interest_paid,
            principal_paid: round_money(principal_paid),
            part_payment,
            pending,
        });
        month += 1;
    }

    if pending > PAYOFF_TOLERANCE {
        warn!(
            months = month,
            pending = %pending,
            "schedule did not pay off within the month ceiling"
        );
        warnings.push(format!(
            "Schedule truncated at {MAX_SCHEDULE_MONTHS} months with {pending} still pending"
        ));
    }

    loan.statement = rows;

    debug!(
        months = month,
        fixed_emi = %fixed_emi,
        contractual_tenure = loan.tenure,
        "statement recalculated"
    );

    Ok(RecalcOutcome {
        months: month,
        fixed_emi,
        closing_balance: pending,
        warnings,
    })
}
