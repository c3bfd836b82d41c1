//! Total and annualized return calculation.
//!
//! Pure arithmetic, no I/O. The orchestrator decides what to do when a
//! calculation is not possible (bad buy price); this module only reports it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed average-year divisor so every run annualizes the same way.
pub const DAYS_PER_YEAR: f64 = 365.24;

/// Terminal artifact of the pipeline: one return entry per trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResult {
    pub symbol: String,
    pub annualized_return: f64,
    pub total_return: f64,
}

impl ReturnResult {
    /// Neutral entry used when a trade degrades instead of aborting the run.
    pub fn zero(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            annualized_return: 0.0,
            total_return: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReturnError {
    #[error("buy price must be a positive number, got {0}")]
    InvalidPrice(f64),
}

/// Calculate total and annualized return for one trade.
///
/// `total = (sell - buy) / buy`, then annualized via compound-growth
/// extrapolation over `days / 365.24` years:
/// `(1 + total) ^ (1 / years) - 1`.
///
/// Two boundaries are defined explicitly:
/// - Same-day purchase and evaluation (`years == 0`): the exponent formula is
///   undefined, so the annualized return equals the total return.
/// - A loss beyond -100% (possible with bad upstream data): `total` is
///   clamped at -1.0 before exponentiation so the result stays real; the
///   annualized return then reports a full loss.
///
/// The caller is responsible for `purchase_date <= end_date`.
pub fn calculate_annualized_return(
    purchase_date: NaiveDate,
    end_date: NaiveDate,
    symbol: &str,
    buy_price: f64,
    sell_price: f64,
) -> Result<ReturnResult, ReturnError> {
    if !(buy_price > 0.0) || !buy_price.is_finite() {
        return Err(ReturnError::InvalidPrice(buy_price));
    }

    let total_return = (sell_price - buy_price) / buy_price;
    let days_between = (end_date - purchase_date).num_days();
    let total_years = days_between as f64 / DAYS_PER_YEAR;

    let annualized_return = if days_between == 0 {
        total_return
    } else {
        let clamped = total_return.max(-1.0);
        (1.0 + clamped).powf(1.0 / total_years) - 1.0
    };

    Ok(ReturnResult {
        symbol: symbol.to_string(),
        annualized_return,
        total_return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn total_return_is_fractional_price_change() {
        let result = calculate_annualized_return(
            date(2019, 1, 2),
            date(2019, 12, 12),
            "AAPL",
            100.0,
            125.0,
        )
        .unwrap();

        assert_eq!(result.total_return, 0.25);
        assert_eq!(result.symbol, "AAPL");
    }

    #[test]
    fn one_year_aapl_scenario() {
        // open 100 on 2020-01-01, close 150 on 2021-01-01: 366 days elapsed.
        let result =
            calculate_annualized_return(date(2020, 1, 1), date(2021, 1, 1), "AAPL", 100.0, 150.0)
                .unwrap();

        assert_eq!(result.total_return, 0.5);
        let expected = 1.5f64.powf(DAYS_PER_YEAR / 366.0) - 1.0;
        assert!((result.annualized_return - expected).abs() < 1e-12);
        assert!((result.annualized_return - 0.499).abs() < 1e-3);
    }

    #[test]
    fn same_day_span_annualized_equals_total() {
        let result =
            calculate_annualized_return(date(2020, 6, 1), date(2020, 6, 1), "TSLA", 200.0, 220.0)
                .unwrap();

        assert!((result.total_return - 0.1).abs() < 1e-12);
        assert_eq!(result.annualized_return, result.total_return);
    }

    #[test]
    fn negative_return_stays_negative() {
        let result =
            calculate_annualized_return(date(2018, 1, 1), date(2020, 1, 1), "GE", 100.0, 60.0)
                .unwrap();

        assert!(result.total_return < 0.0);
        assert!(result.annualized_return < 0.0);
        assert!(result.annualized_return > -1.0);
    }

    #[test]
    fn loss_beyond_full_is_clamped() {
        // sell price below zero can only come from bad upstream data; the
        // annualized figure must stay real instead of going NaN.
        let result =
            calculate_annualized_return(date(2019, 1, 1), date(2020, 1, 1), "BAD", 100.0, -50.0)
                .unwrap();

        assert_eq!(result.total_return, -1.5);
        assert_eq!(result.annualized_return, -1.0);
        assert!(!result.annualized_return.is_nan());
    }

    #[test]
    fn non_positive_buy_price_is_rejected() {
        for buy in [0.0, -10.0, f64::NAN] {
            let err =
                calculate_annualized_return(date(2020, 1, 1), date(2021, 1, 1), "X", buy, 100.0)
                    .unwrap_err();
            assert!(matches!(err, ReturnError::InvalidPrice(_)));
        }
    }

    #[test]
    fn calculation_is_idempotent() {
        let a = calculate_annualized_return(date(2020, 1, 1), date(2022, 7, 4), "AMZN", 93.5, 141.2)
            .unwrap();
        let b = calculate_annualized_return(date(2020, 1, 1), date(2022, 7, 4), "AMZN", 93.5, 141.2)
            .unwrap();
        assert_eq!(a, b);
    }
}
