use clap::Args;
use serde_json::Value;

use loan_tracker_core::analytics::{burn_down, paid_breakdown, portfolio_breakdown};

use super::{open_book, position};
use crate::store::JsonFileStore;

/// Arguments for the burn-down series
#[derive(Args)]
pub struct BurnDownArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,
}

/// Arguments for the paid breakdown
#[derive(Args)]
pub struct BreakdownArgs {
    /// Restrict to one loan (default: every loan)
    #[arg(long)]
    pub loan: Option<usize>,
}

pub fn run_burn_down(args: BurnDownArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let book = open_book(store)?;
    let loan = book.get(position(args.loan, "loan")?)?;
    Ok(serde_json::to_value(burn_down(loan)?)?)
}

pub fn run_breakdown(args: BreakdownArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let book = open_book(store)?;
    let result = match args.loan {
        Some(n) => paid_breakdown(book.get(position(n, "loan")?)?),
        None => portfolio_breakdown(book.loans()),
    };
    Ok(serde_json::to_value(result)?)
}
