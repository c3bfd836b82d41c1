use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::data_paths::DataPaths;
use crate::trades::read_trades_from_json;

#[derive(Args, Clone)]
pub struct SymbolsArgs {
    /// Path to the trades JSON file
    pub trades_file: PathBuf,
}

pub struct SymbolsCommand {
    args: SymbolsArgs,
}

impl SymbolsCommand {
    pub fn new(args: SymbolsArgs) -> Self {
        Self { args }
    }

    /// Parse-only smoke command: prints the symbols in input order.
    pub async fn execute(&self, _data_paths: DataPaths) -> Result<()> {
        let trades = read_trades_from_json(&self.args.trades_file)?;
        let symbols: Vec<&str> = trades.iter().map(|t| t.symbol.as_str()).collect();
        println!("{}", serde_json::to_string(&symbols)?);
        Ok(())
    }
}
