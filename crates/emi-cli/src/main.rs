mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::afford::AffordArgs;
use commands::schedule::{ScheduleArgs, SummarizeArgs};
use emi_core::EmiError;

/// Loan EMI and amortization schedule calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan EMI and amortization schedule calculations",
    long_about = "A CLI for computing equated monthly installments, full amortization \
                  schedules, yearly summaries and loan affordability with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (YAML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log computation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the EMI and month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Fold an amortization schedule into yearly (or other) periods
    Summarize(SummarizeArgs),
    /// Largest loan a monthly installment can repay
    Afford(AffordArgs),
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

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("emi_core=debug,emi=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries results, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine_config = match cli.config.as_deref().map(config::load_engine_config) {
        Some(Ok(cfg)) => Some(cfg),
        Some(Err(e)) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
        None => None,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, engine_config),
        Commands::Summarize(args) => commands::schedule::run_summarize(args),
        Commands::Afford(args) => commands::afford::run_afford(args, engine_config),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            let emi_err = e.downcast_ref::<EmiError>();
            if let (OutputFormat::Json, Some(emi_err)) = (&cli.output, emi_err) {
                if let Ok(body) = serde_json::to_value(emi_err.to_response()) {
                    output::json::print_json(&body);
                }
            }
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
