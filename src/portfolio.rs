//! Portfolio report orchestration.
//!
//! Runs the fetch-and-calculate unit for every trade concurrently, gated by
//! the shared [`RateLimiter`], then aggregates and sorts single-threadedly.
//! Per-trade failures never short-circuit the batch: under the default
//! [`FailurePolicy::ZeroFallback`] they degrade to a zero-valued entry with a
//! warning, so the output always covers every input trade. Only malformed
//! input (handled upstream in `trades`) aborts a run.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, FailurePolicy};
use crate::provider::{PriceDataProvider, PricePoint, ProviderError};
use crate::rate_limit::RateLimiter;
use crate::returns::{calculate_annualized_return, ReturnError, ReturnResult};
use crate::trades::TradeRecord;

/// Why a single trade could not be evaluated. Every variant is recoverable
/// at the per-trade boundary; none of them is allowed to abort the batch
/// under the default policy.
#[derive(Debug, Error)]
pub enum TradeFailure {
    #[error("purchase date {purchase} is after end date {end}")]
    InvalidTradeDate { purchase: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("no price data for the requested range")]
    NoData,

    #[error(transparent)]
    InvalidPrice(#[from] ReturnError),

    #[error("run deadline elapsed before the trade completed")]
    Cancelled,
}

/// Closing price of one symbol on the end date (zero when no data).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingQuote {
    pub symbol: String,
    pub close: f64,
}

/// Top-level coordinator for one report run.
pub struct PortfolioReport {
    provider: Arc<dyn PriceDataProvider>,
    limiter: RateLimiter,
    timeout: std::time::Duration,
    failure_policy: FailurePolicy,
}

impl PortfolioReport {
    pub fn new(provider: Arc<dyn PriceDataProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            limiter: RateLimiter::new(config.requests_per_second),
            timeout: config.timeout,
            failure_policy: config.failure_policy,
        }
    }

    /// Compute total and annualized returns for every trade, sorted by
    /// annualized return descending (ties keep input order).
    pub async fn run(
        &self,
        trades: &[TradeRecord],
        end_date: NaiveDate,
    ) -> Result<Vec<ReturnResult>> {
        let deadline = Instant::now() + self.timeout;
        info!(
            trades = trades.len(),
            %end_date,
            provider = self.provider.name(),
            "Starting portfolio report"
        );

        // join_all keeps completion values in input order, so tie-breaking by
        // input position falls out of the stable sort below.
        let units = trades
            .iter()
            .map(|trade| self.evaluate_trade(trade, end_date, deadline));
        let outcomes = futures::future::join_all(units).await;

        let mut report = Vec::with_capacity(trades.len());
        for (trade, outcome) in trades.iter().zip(outcomes) {
            report.push(self.fold_outcome(&trade.symbol, outcome, |symbol| {
                ReturnResult::zero(symbol)
            })?);
        }

        report.sort_by(|a, b| b.annualized_return.total_cmp(&a.annualized_return));
        Ok(report)
    }

    /// Closing price on the end date per symbol, ordered ascending by close.
    /// Symbols without data report a zero close.
    pub async fn closing_quotes(
        &self,
        trades: &[TradeRecord],
        end_date: NaiveDate,
    ) -> Result<Vec<ClosingQuote>> {
        let deadline = Instant::now() + self.timeout;

        let units = trades.iter().map(|trade| async move {
            let candles = match tokio::time::timeout_at(
                deadline,
                self.fetch_candles(trade, end_date),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(TradeFailure::Cancelled),
            };
            candles.and_then(|candles| match candles.last() {
                Some(last) => Ok(ClosingQuote {
                    symbol: trade.symbol.clone(),
                    close: last.close,
                }),
                None => Err(TradeFailure::NoData),
            })
        });
        let outcomes = futures::future::join_all(units).await;

        let mut quotes = Vec::with_capacity(trades.len());
        for (trade, outcome) in trades.iter().zip(outcomes) {
            quotes.push(self.fold_outcome(&trade.symbol, outcome, |symbol| ClosingQuote {
                symbol: symbol.into(),
                close: 0.0,
            })?);
        }

        quotes.sort_by(|a, b| a.close.total_cmp(&b.close));
        Ok(quotes)
    }

    /// One fetch-and-calculate unit, bounded by the run deadline.
    async fn evaluate_trade(
        &self,
        trade: &TradeRecord,
        end_date: NaiveDate,
        deadline: Instant,
    ) -> Result<ReturnResult, TradeFailure> {
        match tokio::time::timeout_at(deadline, self.process_trade(trade, end_date)).await {
            Ok(result) => result,
            Err(_) => Err(TradeFailure::Cancelled),
        }
    }

    async fn process_trade(
        &self,
        trade: &TradeRecord,
        end_date: NaiveDate,
    ) -> Result<ReturnResult, TradeFailure> {
        let candles = self.fetch_candles(trade, end_date).await?;

        // Purchase or end date may fall on a non-trading day; the first and
        // last returned candles are the nearest available days.
        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TradeFailure::NoData),
        };

        debug!(
            symbol = %trade.symbol,
            buy = first.open,
            sell = last.close,
            "Calculating return"
        );
        Ok(calculate_annualized_return(
            trade.purchase_date,
            end_date,
            &trade.symbol,
            first.open,
            last.close,
        )?)
    }

    /// Rate-limited candle fetch with the purchase-date invariant checked
    /// before any network I/O.
    async fn fetch_candles(
        &self,
        trade: &TradeRecord,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, TradeFailure> {
        if trade.purchase_date > end_date {
            return Err(TradeFailure::InvalidTradeDate {
                purchase: trade.purchase_date,
                end: end_date,
            });
        }

        self.limiter.acquire().await;
        let candles = self
            .provider
            .fetch(&trade.symbol, trade.purchase_date, end_date)
            .await?;
        Ok(candles)
    }

    /// Apply the configured failure policy to one per-trade outcome.
    fn fold_outcome<T>(
        &self,
        symbol: &str,
        outcome: Result<T, TradeFailure>,
        fallback: impl FnOnce(&str) -> T,
    ) -> Result<T> {
        match outcome {
            Ok(value) => Ok(value),
            // Empty price data is an explicit fallback, never a fatal error,
            // regardless of the configured policy.
            Err(TradeFailure::NoData) => {
                info!(symbol, "No price data in range, reporting zero return");
                Ok(fallback(symbol))
            }
            Err(failure) => match self.failure_policy {
                FailurePolicy::Abort => {
                    Err(anyhow!(failure).context(format!("Trade {symbol} failed")))
                }
                FailurePolicy::ZeroFallback => {
                    warn!(symbol, error = %failure, "Degrading trade to zero return");
                    Ok(fallback(symbol))
                }
            },
        }
    }
}
