//! Trade list parsing.
//!
//! The input file is a JSON array of trade objects:
//! `[{"symbol": "AAPL", "purchaseDate": "2020-01-01", "quantity": 10}, ...]`
//! with `quantity` optional. A file that cannot be read or parsed is a fatal
//! error; everything downstream assumes a well-formed trade list.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded stock purchase, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub symbol: String,
    pub purchase_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

/// Read and validate a trade list from a JSON file.
///
/// Symbols are trimmed and uppercase-normalized. An empty symbol or a zero
/// quantity is malformed input and aborts the run.
pub fn read_trades_from_json(path: &Path) -> Result<Vec<TradeRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trades file: {}", path.display()))?;

    let mut trades: Vec<TradeRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse trades file as JSON: {}", path.display()))?;

    for trade in &mut trades {
        trade.symbol = trade.symbol.trim().to_uppercase();
        if trade.symbol.is_empty() {
            bail!("Trade with empty symbol in {}", path.display());
        }
        if trade.quantity == Some(0) {
            bail!("Trade {} has zero quantity", trade.symbol);
        }
    }

    Ok(trades)
}
