pub mod loan;
pub mod report;
pub mod statement;

use serde_json::Value;

use loan_tracker_core::analytics::loan_summary;
use loan_tracker_core::{Loan, LoanBook, RecalcOutcome};

use crate::store::JsonFileStore;

/// Load the book. Statements rebuilt during load are saved straight back.
pub fn open_book(store: &JsonFileStore) -> Result<LoanBook, Box<dyn std::error::Error>> {
    let (book, repaired) = LoanBook::load_from(store)?;
    if repaired {
        book.save_to(store)?;
    }
    Ok(book)
}

/// Convert a 1-based `--loan` / `--month` position to an index.
pub fn position(value: usize, flag: &str) -> Result<usize, Box<dyn std::error::Error>> {
    value
        .checked_sub(1)
        .ok_or_else(|| format!("--{} counts from 1", flag).into())
}

/// Summary envelope for `loan`, with any recalculation warnings appended.
pub fn summary_value(
    number: usize,
    loan: &Loan,
    outcome: Option<RecalcOutcome>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut summary = loan_summary(loan)?;
    if let Some(outcome) = outcome {
        summary.warnings.extend(outcome.warnings);
    }
    let mut value = serde_json::to_value(summary)?;
    if let Some(Value::Object(result)) = value.get_mut("result") {
        result.insert("loan".into(), Value::from(number));
    }
    Ok(value)
}
