use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data_paths::DataPaths;
use crate::portfolio::PortfolioReport;
use crate::provider::TiingoProvider;
use crate::trades::read_trades_from_json;

#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Path to the trades JSON file
    pub trades_file: PathBuf,

    /// Portfolio end date (yyyy-MM-dd)
    pub end_date: NaiveDate,

    /// Override the price API base URL (env: STOCKFOLIO_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the price API token (env: STOCKFOLIO_API_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

pub struct ReportCommand {
    args: ReportArgs,
}

impl ReportCommand {
    pub fn new(args: ReportArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, _data_paths: DataPaths) -> Result<()> {
        let config = AppConfig::from_env(self.args.base_url.clone(), self.args.token.clone())?;
        let trades = read_trades_from_json(&self.args.trades_file)?;

        let provider = Arc::new(TiingoProvider::from_config(&config));
        let report = PortfolioReport::new(provider, &config);
        let results = report.run(&trades, self.args.end_date).await?;

        // Report JSON on stdout, human summary on stderr.
        println!("{}", serde_json::to_string(&results)?);
        eprintln!(
            "{}",
            format!("✅ Evaluated {} trades", results.len()).green()
        );
        Ok(())
    }
}
