pub mod book;
pub mod emi;
pub mod error;
pub mod loan;
pub mod recalc;
pub mod schedule;
pub mod types;

#[cfg(feature = "analytics")]
pub mod analytics;

pub use book::{LoanBook, LoanStore, MemoryStore};
pub use error::LoanTrackerError;
pub use loan::{
    create_loan, edit_loan_terms, set_monthly_rate, set_part_payment, Loan, LoanInput, LoanTerms,
    StatementRow, MAX_ANNUAL_RATE,
};
pub use recalc::{recalc_statement, RecalcOutcome, MAX_SCHEDULE_MONTHS};
pub use schedule::generate_statement;
pub use types::*;

/// Standard result type for all loan-tracker operations
pub type LoanTrackerResult<T> = Result<T, LoanTrackerError>;
