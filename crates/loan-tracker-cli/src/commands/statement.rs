use std::fs::File;
use std::io;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_tracker_core::{set_monthly_rate, set_part_payment};

use super::{open_book, position, summary_value};
use crate::output::csv_out;
use crate::store::JsonFileStore;

/// Arguments for recording a part payment
#[derive(Args)]
pub struct PartPaymentArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,

    /// Statement month, counting from 1
    #[arg(long)]
    pub month: usize,

    /// Extra principal paid that month (0 removes it)
    #[arg(long)]
    pub amount: Decimal,
}

/// Arguments for a one-month rate change
#[derive(Args)]
pub struct RateArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,

    /// Statement month, counting from 1
    #[arg(long)]
    pub month: usize,

    /// Annual rate in percent for that month
    #[arg(long, required_unless_present = "clear")]
    pub rate: Option<Decimal>,

    /// Drop the override so the month follows the loan rate
    #[arg(long, conflicts_with = "rate")]
    pub clear: bool,
}

/// Arguments for statement export
#[derive(Args)]
pub struct ExportArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub file: Option<String>,
}

pub fn run_part_payment(
    args: PartPaymentArgs,
    store: &JsonFileStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut book = open_book(store)?;
    let loan = book.get_mut(position(args.loan, "loan")?)?;
    let outcome = set_part_payment(loan, position(args.month, "month")?, args.amount)?;
    let value = summary_value(args.loan, loan, Some(outcome))?;
    book.save_to(store)?;
    Ok(value)
}

pub fn run_rate(args: RateArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let rate = if args.clear { None } else { args.rate };
    if rate.is_none() && !args.clear {
        return Err("--rate or --clear is required".into());
    }

    let mut book = open_book(store)?;
    let loan = book.get_mut(position(args.loan, "loan")?)?;
    let outcome = set_monthly_rate(loan, position(args.month, "month")?, rate)?;
    let value = summary_value(args.loan, loan, Some(outcome))?;
    book.save_to(store)?;
    Ok(value)
}

/// Writes the statement CSV. With `--file` a short receipt is returned for
/// the normal output path; on stdout the CSV is the output.
pub fn run_export(args: ExportArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let book = open_book(store)?;
    let loan = book.get(position(args.loan, "loan")?)?;

    match args.file {
        Some(path) => {
            let file = File::create(&path)
                .map_err(|e| format!("Failed to create '{}': {}", path, e))?;
            csv_out::write_statement(&loan.statement, file)?;
            Ok(json!({
                "file": path,
                "rows": loan.statement.len(),
            }))
        }
        None => {
            csv_out::write_statement(&loan.statement, io::stdout().lock())?;
            Ok(Value::Null)
        }
    }
}
