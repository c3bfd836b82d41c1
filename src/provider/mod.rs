//! Historical price data providers.
//!
//! The orchestrator talks to the price API exclusively through the
//! [`PriceDataProvider`] trait so tests can swap in scripted providers and
//! the HTTP implementation stays a thin collaborator at the edge.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

mod tiingo;
pub use tiingo::TiingoProvider;

/// One trading day's candle for one symbol.
///
/// The upstream API reports the date as a full ISO-8601 timestamp
/// (`"2020-01-02T00:00:00.000Z"`); only the calendar date matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(deserialize_with = "candle_date")]
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

fn candle_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network-layer failure: DNS, connect, timeout, broken transfer.
    #[error("price API unreachable: {0}")]
    Unavailable(String),

    /// The API answered with a non-success status.
    #[error("price API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected candle array.
    #[error("failed to decode price API response: {0}")]
    Decode(String),
}

/// Source of daily price history.
///
/// `fetch` returns the candles for `[start, end]` ascending by date; gaps for
/// non-trading days are expected. An empty range result is `Ok(vec![])`, not
/// an error; callers decide whether "no data" means a zero return.
#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    /// Human-readable provider name for log lines.
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}
