//! Tiingo-style HTTP implementation of [`PriceDataProvider`].

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::{PriceDataProvider, PricePoint, ProviderError};
use crate::config::AppConfig;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Daily-price client for the Tiingo EOD API
/// (`GET {base_url}/{symbol}/prices?startDate=..&endDate=..&token=..`).
pub struct TiingoProvider {
    client: Client,
    base_url: String,
    token: String,
    retry_attempts: u32,
}

impl TiingoProvider {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        retry_attempts: u32,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            retry_attempts: retry_attempts.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.base_url, &config.api_token, config.retry_attempts)
    }

    /// Request URL without the token, safe to log.
    fn price_url(&self, symbol: &str) -> String {
        format!("{}/{}/prices", self.base_url, symbol)
    }

    async fn fetch_once(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let url = self.price_url(symbol);
        debug!(%url, %start, %end, "Requesting price history");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
                ("token", self.token.clone()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut candles: Vec<PricePoint> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        // The API contract is ascending by date; enforce it so buy/sell
        // extraction can rely on first/last.
        candles.sort_by_key(|candle| candle.date);
        Ok(candles)
    }
}

/// Transient failures worth another attempt; client-side errors are not.
fn is_retryable(error: &ProviderError) -> bool {
    match error {
        ProviderError::Unavailable(_) => true,
        ProviderError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        ProviderError::Decode(_) => false,
    }
}

#[async_trait]
impl PriceDataProvider for TiingoProvider {
    fn name(&self) -> &str {
        "Tiingo EOD"
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            match self.fetch_once(symbol, start, end).await {
                Ok(candles) => {
                    debug!(symbol, candles = candles.len(), "Price history fetched");
                    return Ok(candles);
                }
                Err(e) if is_retryable(&e) && attempt < self.retry_attempts => {
                    let delay = RETRY_BASE_DELAY * attempt;
                    warn!(symbol, attempt, error = %e, "Fetch attempt failed, retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Unreachable with retry_attempts >= 1, but keeps the loop honest.
        Err(last_error.unwrap_or_else(|| ProviderError::Unavailable("no attempts made".into())))
    }
}
