mod commands;
mod input;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::loan::{CreateArgs, EditArgs, LoanArgs};
use commands::report::{BreakdownArgs, BurnDownArgs};
use commands::statement::{ExportArgs, PartPaymentArgs, RateArgs};
use store::JsonFileStore;

/// Track loans, part payments and rate changes
#[derive(Parser)]
#[command(
    name = "loans",
    version,
    about = "Track loans, part payments and rate changes",
    long_about = "Keeps a list of loans with their month-by-month statements. \
                  Part payments shorten the schedule against the original EMI; \
                  one-month rate changes and edits to principal, rate or tenure \
                  replay the statement while keeping entered overrides."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Loan document to read and write
    #[arg(long, env = "LOAN_TRACKER_STORE", default_value = "loans.json", global = true)]
    store: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a loan and generate its statement
    Create(CreateArgs),
    /// List loans with their end month
    List,
    /// Show a loan's statement
    Show(LoanArgs),
    /// Change principal, rate or tenure, keeping entered overrides
    Edit(EditArgs),
    /// Record a part payment for one month
    PartPayment(PartPaymentArgs),
    /// Set or clear the interest rate for one month
    Rate(RateArgs),
    /// Delete a loan
    Delete(LoanArgs),
    /// Export a statement as CSV
    Export(ExportArgs),
    /// Pending balance against the original plan
    BurnDown(BurnDownArgs),
    /// Principal, interest and part payments paid so far
    Breakdown(BreakdownArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    // stderr keeps stdout clean for json/csv output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let store = match JsonFileStore::open(&cli.store) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    debug!(store = %store.path().display(), "using loan store");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Create(args) => commands::loan::run_create(args, &store),
        Commands::List => commands::loan::run_list(&store),
        Commands::Show(args) => commands::loan::run_show(args, &store),
        Commands::Edit(args) => commands::loan::run_edit(args, &store),
        Commands::PartPayment(args) => commands::statement::run_part_payment(args, &store),
        Commands::Rate(args) => commands::statement::run_rate(args, &store),
        Commands::Delete(args) => commands::loan::run_delete(args, &store),
        Commands::Export(args) => commands::statement::run_export(args, &store),
        Commands::BurnDown(args) => commands::report::run_burn_down(args, &store),
        Commands::Breakdown(args) => commands::report::run_breakdown(args, &store),
        Commands::Version => {
            println!("loans {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if !value.is_null() {
                output::format_output(&cli.output, &value);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
