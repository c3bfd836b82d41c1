//! CLI module for stockfolio
//!
//! Uses clap for argument parsing and a structured command pattern: one
//! `XxxArgs`/`XxxCommand` pair per subcommand, constructed from parsed args
//! and driven by `execute`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{init_logging, LoggingConfig};

use commands::quotes::{QuotesArgs, QuotesCommand};
use commands::report::{ReportArgs, ReportCommand};
use commands::symbols::{SymbolsArgs, SymbolsCommand};

#[derive(Parser)]
#[command(name = "stockfolio")]
#[command(version)]
#[command(about = "Annualized stock return reports from daily price history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute total and annualized returns for each trade
    Report(ReportArgs),

    /// Show closing prices on the end date, ordered ascending by close
    Quotes(QuotesArgs),

    /// List the symbols in a trades file
    Symbols(SymbolsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;
        init_logging(LoggingConfig::new(data_paths.clone(), self.verbose))?;

        match self.command {
            Commands::Report(args) => ReportCommand::new(args).execute(data_paths).await,
            Commands::Quotes(args) => QuotesCommand::new(args).execute(data_paths).await,
            Commands::Symbols(args) => SymbolsCommand::new(args).execute(data_paths).await,
        }
    }
}
