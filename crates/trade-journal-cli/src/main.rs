mod commands;
mod config;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::journal::{SummaryArgs, TradesArgs};
use commands::trade::{TradeArgs, ValidateArgs};
use config::CliConfig;

/// Trade P&L, risk/reward and journal analytics
#[derive(Parser)]
#[command(
    name = "tj",
    version,
    about = "Trade P&L, risk/reward and journal analytics",
    long_about = "A CLI for trading journal calculations with decimal precision. \
                  Computes gross/net P&L, ROI and planned risk/reward for a trade, \
                  validates stop-loss and take-profit placement, lists journal \
                  trades with search and pagination, and summarises performance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML or JSON file with defaults (fee_rate, currency, page_size)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate P&L, ROI and risk/reward for a single trade
    Trade(TradeArgs),
    /// Validate raw trade form fields
    Validate(ValidateArgs),
    /// List journal trades with search, filters and pagination
    Trades(TradesArgs),
    /// Summarise journal performance
    Summary(SummaryArgs),
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

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Trade(args) => commands::trade::run_trade(args, &config),
        Commands::Validate(args) => commands::trade::run_validate(args),
        Commands::Trades(args) => commands::journal::run_trades(args, &config),
        Commands::Summary(args) => commands::journal::run_summary(args, &config),
        Commands::Version => {
            println!("tj {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
