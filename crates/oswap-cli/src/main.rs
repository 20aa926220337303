//! # oswap CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oswap_cli::asset::{run_asset, AssetArgs};
use oswap_cli::custody::{run_custody, CustodyArgs};
use oswap_cli::order::{run_order, OrderArgs};
use oswap_cli::workspace::DEFAULT_STATE_FILE;
use oswap_cli::StateOptions;

/// orderswap CLI
///
/// Escrow ledger for bilateral asset swaps, operating on a local JSON state
/// file.
#[derive(Parser, Debug)]
#[command(name = "oswap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the state file.
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Custody account of the escrow ledger. Fixed when the state file is
    /// created; later invocations must match it.
    #[arg(long, global = true)]
    ledger_account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register assets, mint, approve, and read balances.
    Asset(AssetArgs),

    /// Deposit, purchase, cancel, withdraw, and inspect orders.
    Order(OrderArgs),

    /// Show what the escrow ledger holds.
    Custody(CustodyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = StateOptions {
        path: cli.state,
        ledger_account: cli.ledger_account,
    };
    tracing::debug!(state = %opts.path.display(), "oswap starting");

    let result = match &cli.command {
        Commands::Asset(args) => run_asset(args, &opts),
        Commands::Order(args) => run_order(args, &opts),
        Commands::Custody(args) => run_custody(args, &opts),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
