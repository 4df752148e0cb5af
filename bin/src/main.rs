//! rosabar CLI - Dukascopy M1 bar history updater.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod layout;

#[derive(Parser)]
#[command(name = "rosabar")]
#[command(about = "Dukascopy M1 bar history and synthetic FX indexes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the local M1 history of one or more symbols
    Update {
        /// Symbols to update (e.g., audusd, eurusd)
        #[arg(required = true)]
        symbols: Vec<String>,

        /// First FXT day (YYYY-MM-DD). Defaults to the symbol's history start.
        #[arg(short, long)]
        start: Option<String>,

        /// Last FXT day (YYYY-MM-DD). Defaults to yesterday.
        #[arg(short, long)]
        end: Option<String>,

        /// Storage root directory
        #[arg(long, env = "ROSABAR_STORAGE")]
        storage: Option<PathBuf>,

        /// Keep downloaded vendor files
        #[arg(long)]
        keep_downloads: bool,

        /// Maximum concurrent downloads
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Decode a local Dukascopy candle or tick file
    Decode {
        /// File to decode (bi5 or already decompressed)
        file: PathBuf,

        /// Symbol the file belongs to (sets the quote digits)
        #[arg(long)]
        symbol: Option<String>,

        /// GMT day the file covers (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,

        /// Decode tick records instead of candles
        #[arg(long)]
        ticks: bool,
    },

    /// Fetch and print the vendor's history start
    HistoryStart {
        /// Symbol (omit for all symbols)
        symbol: Option<String>,
    },

    /// Compute one day of a synthetic instrument from stored history
    Synthetic {
        /// Formula identifier (e.g., audfxi, usdlfx)
        formula: String,

        /// FXT day (YYYY-MM-DD). Defaults to the first day all components are available.
        #[arg(short, long)]
        day: Option<String>,

        /// Storage root directory
        #[arg(long, env = "ROSABAR_STORAGE")]
        storage: Option<PathBuf>,
    },

    /// List known instruments
    List {
        /// Filter by category (forex, metals, index, commodity, crypto, synthetic)
        #[arg(short, long)]
        category: Option<String>,

        /// Search pattern
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Installs the log subscriber. `RUST_LOG` takes precedence over the flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Update {
            symbols,
            start,
            end,
            storage,
            keep_downloads,
            concurrency,
        } => {
            commands::update::update(
                &symbols,
                start.as_deref(),
                end.as_deref(),
                storage,
                keep_downloads,
                concurrency,
                cli.quiet,
            )
            .await
        }
        Commands::Decode {
            file,
            symbol,
            day,
            ticks,
        } => commands::decode::decode(&file, symbol.as_deref(), day.as_deref(), ticks),
        Commands::HistoryStart { symbol } => commands::history_start::history_start(symbol.as_deref()).await,
        Commands::Synthetic {
            formula,
            day,
            storage,
        } => commands::synthetic::synthetic(&formula, day.as_deref(), storage),
        Commands::List { category, search } => {
            commands::list::list_instruments(category.as_deref(), search.as_deref())
        }
    }
}
