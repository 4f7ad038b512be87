use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_tracker_core::analytics::loan_summary;
use loan_tracker_core::{edit_loan_terms, LoanInput, LoanTerms};

use super::{open_book, position, summary_value};
use crate::input;
use crate::store::JsonFileStore;

/// Arguments for adding a loan
#[derive(Args)]
pub struct CreateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Optional label
    #[arg(long)]
    pub name: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 10.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// First installment month as YYYY-MM-DD (defaults to this month)
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

/// Arguments selecting one loan
#[derive(Args)]
pub struct LoanArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,
}

/// Arguments for editing principal, rate or tenure
#[derive(Args)]
pub struct EditArgs {
    /// Loan number as shown by `list`
    #[arg(long)]
    pub loan: usize,

    /// New principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// New annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// New term in months
    #[arg(long)]
    pub tenure: Option<u32>,
}

pub fn run_create(args: CreateArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = match input::read_payload(args.input.as_deref())? {
        Some(payload) => payload,
        None => LoanInput {
            name: args.name,
            principal: args.principal
                .ok_or("--principal is required (or provide --input)")?,
            interest_rate: args.rate
                .ok_or("--rate is required (or provide --input)")?,
            tenure: args.tenure
                .ok_or("--tenure is required (or provide --input)")?,
            start_date: args.start,
        },
    };

    let mut book = open_book(store)?;
    let index = book.add_loan(&loan_input)?;
    book.save_to(store)?;

    summary_value(index + 1, book.get(index)?, None)
}

pub fn run_list(store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let book = open_book(store)?;
    let mut rows = Vec::with_capacity(book.len());
    for (i, loan) in book.loans().iter().enumerate() {
        let summary = loan_summary(loan)?.result;
        rows.push(json!({
            "loan": i + 1,
            "name": summary.name.clone().unwrap_or_default(),
            "headline": summary.headline(),
            "emi": summary.original_emi.to_string(),
            "months": summary.realised_tenure,
            "pending": summary.closing_balance.to_string(),
        }));
    }
    Ok(Value::Array(rows))
}

/// The statement of one loan, one flat object per month.
pub fn run_show(args: LoanArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let book = open_book(store)?;
    let loan = book.get(position(args.loan, "loan")?)?;
    let rows: Vec<Value> = loan
        .statement
        .iter()
        .map(|row| {
            json!({
                "month": row.month,
                "date": row.label(),
                "emi": row.emi.to_string(),
                "principal_paid": row.principal_paid.to_string(),
                "interest_paid": row.interest_paid.to_string(),
                "part_payment": row.part_payment.to_string(),
                "interest_rate": row.interest_rate.normalize().to_string(),
                "rate_override": row.rate_override.is_some(),
                "pending": row.pending.to_string(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

pub fn run_edit(args: EditArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let mut book = open_book(store)?;
    let index = position(args.loan, "loan")?;
    let loan = book.get_mut(index)?;

    let current = loan.terms();
    let terms = LoanTerms {
        principal: args.principal.unwrap_or(current.principal),
        interest_rate: args.rate.unwrap_or(current.interest_rate),
        tenure: args.tenure.unwrap_or(current.tenure),
    };

    let outcome = edit_loan_terms(loan, &terms)?;
    let changed = outcome.is_some();
    let mut value = summary_value(args.loan, loan, outcome)?;
    if changed {
        book.save_to(store)?;
    } else if let Some(Value::Array(warnings)) = value.get_mut("warnings") {
        warnings.push(Value::from("Terms unchanged; nothing saved"));
    }
    Ok(value)
}

pub fn run_delete(args: LoanArgs, store: &JsonFileStore) -> Result<Value, Box<dyn std::error::Error>> {
    let mut book = open_book(store)?;
    book.delete_loan(position(args.loan, "loan")?)?;
    book.save_to(store)?;
    Ok(json!({
        "deleted": args.loan,
        "remaining": book.len(),
    }))
}
