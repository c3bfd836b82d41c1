pub mod cli;
pub mod config;
pub mod data_paths;
pub mod logging;
pub mod portfolio;
pub mod provider;
pub mod rate_limit;
pub mod returns;
pub mod trades;

pub use config::{AppConfig, FailurePolicy};
pub use portfolio::PortfolioReport;
pub use provider::{PriceDataProvider, PricePoint, ProviderError, TiingoProvider};
pub use rate_limit::RateLimiter;
pub use returns::{calculate_annualized_return, ReturnResult};
pub use trades::{read_trades_from_json, TradeRecord};
