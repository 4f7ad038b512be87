//! Shared amortization helpers: monthly rate conversion, the level-payment
//! EMI formula, whole-unit rounding and installment month arithmetic.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::LoanTrackerError;
use crate::types::{Money, Rate};
use crate::LoanTrackerResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Display format for installment months, e.g. `Jan 2025`.
pub const MONTH_LABEL_FORMAT: &str = "%b %Y";

/// Convert an annual percentage rate into the flat monthly decimal rate.
pub fn monthly_rate(annual_rate: Rate) -> Decimal {
    annual_rate / MONTHS_PER_YEAR / PERCENT
}

/// Round to whole currency units, halves away from zero.
pub fn round_money(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Interest charged for one month on `balance` at `annual_rate`.
pub fn monthly_interest(balance: Money, annual_rate: Rate) -> Money {
    round_money(balance * monthly_rate(annual_rate))
}

/// Level-payment EMI over `months` installments, rounded to whole units.
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1). At r = 0 the formula has a
/// removable singularity and the limit P / n is used instead. When (1 + r)^n
/// overflows the payment converges on interest-only, P * r.
pub fn calc_emi(principal: Money, annual_rate: Rate, months: u32) -> LoanTrackerResult<Money> {
    if months == 0 {
        return Err(LoanTrackerError::InvalidInput {
            field: "tenure".into(),
            reason: "Number of months must be > 0".into(),
        });
    }
    if annual_rate < Decimal::ZERO {
        return Err(LoanTrackerError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }

    let r = monthly_rate(annual_rate);
    if r.is_zero() {
        return Ok(round_money(principal / Decimal::from(months)));
    }

    let payment = match (Decimal::ONE + r).checked_powu(u64::from(months)) {
        Some(factor) if factor > Decimal::ONE => {
            principal * r * (factor / (factor - Decimal::ONE))
        }
        // rate below decimal precision
        Some(_) => principal / Decimal::from(months),
        None => principal * r,
    };
    Ok(round_money(payment))
}

/// Normalise any date to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> LoanTrackerResult<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| LoanTrackerError::DateError(format!("cannot normalise {date}")))
}

/// The installment month `offset` months after `start`.
pub fn installment_date(start: NaiveDate, offset: u32) -> LoanTrackerResult<NaiveDate> {
    start
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| {
            LoanTrackerError::DateError(format!("{start} + {offset} months is out of range"))
        })
}

pub fn month_label(date: NaiveDate) -> String {
    date.format(MONTH_LABEL_FORMAT).to_string()
}
