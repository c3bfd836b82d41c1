//! Runtime configuration.
//!
//! Everything the pipeline needs from the environment is collected into one
//! explicit [`AppConfig`] handed to the orchestrator; there is no process-wide
//! static state and no token baked into the source. Values come from the
//! environment (a `.env` file is loaded at startup), with the base URL and
//! token overridable from the CLI.

use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "STOCKFOLIO_BASE_URL";
pub const ENV_API_TOKEN: &str = "STOCKFOLIO_API_TOKEN";
pub const ENV_RPS: &str = "STOCKFOLIO_RPS";
pub const ENV_TIMEOUT_SECS: &str = "STOCKFOLIO_TIMEOUT_SECS";
pub const ENV_RETRY_ATTEMPTS: &str = "STOCKFOLIO_RETRY_ATTEMPTS";
pub const ENV_FAILURE_POLICY: &str = "STOCKFOLIO_FAILURE_POLICY";

const DEFAULT_RPS: u32 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// What to do when a single trade cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Degrade the trade to a zero-valued entry and keep going.
    #[default]
    ZeroFallback,
    /// Fail the whole run on the first trade that cannot be evaluated.
    /// A symbol with no price data in range is not a failure and still
    /// degrades to a zero entry under this policy.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero-fallback" | "zero_fallback" | "degrade" => Ok(Self::ZeroFallback),
            "abort" | "strict" => Ok(Self::Abort),
            other => bail!("Unknown failure policy '{other}' (expected 'zero-fallback' or 'abort')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Price API base URL, e.g. `https://api.tiingo.com/tiingo/daily`.
    pub base_url: String,
    /// Bearer token for the price API.
    pub api_token: String,
    /// Outbound request ceiling toward the provider.
    pub requests_per_second: u32,
    /// Run-scoped deadline; trades still in flight when it expires degrade
    /// to zero-valued entries.
    pub timeout: Duration,
    /// Attempts per fetch before a provider failure is reported.
    pub retry_attempts: u32,
    pub failure_policy: FailurePolicy,
}

impl AppConfig {
    /// Build the configuration from the environment, with optional CLI
    /// overrides for the base URL and token.
    pub fn from_env(base_url: Option<String>, api_token: Option<String>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env_var(ENV_BASE_URL))
            .with_context(|| format!("Price API base URL not set ({ENV_BASE_URL})"))?;
        let api_token = api_token
            .or_else(|| env_var(ENV_API_TOKEN))
            .with_context(|| format!("Price API token not set ({ENV_API_TOKEN})"))?;

        let config = Self {
            base_url: normalize_base_url(&base_url),
            api_token,
            requests_per_second: env_parse(ENV_RPS)?.unwrap_or(DEFAULT_RPS),
            timeout: Duration::from_secs(
                env_parse(ENV_TIMEOUT_SECS)?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            retry_attempts: env_parse(ENV_RETRY_ATTEMPTS)?.unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            failure_policy: env_parse(ENV_FAILURE_POLICY)?.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            bail!("Price API token is empty ({ENV_API_TOKEN})");
        }
        if self.requests_per_second == 0 {
            bail!("{ENV_RPS} must be at least 1");
        }
        if self.retry_attempts == 0 {
            bail!("{ENV_RETRY_ATTEMPTS} must be at least 1");
        }
        if self.timeout.is_zero() {
            bail!("{ENV_TIMEOUT_SECS} must be at least 1");
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse() {
            Ok(value) => Ok(Some(value)),
            Err(e) => bail!("Invalid value '{raw}' for {name}: {e}"),
        },
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_policy_parses_known_names() {
        assert_eq!(
            "zero-fallback".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::ZeroFallback
        );
        assert_eq!(
            "ABORT".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::Abort
        );
        assert!("sometimes".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn failure_policy_defaults_to_zero_fallback() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::ZeroFallback);
    }

    #[test]
    fn base_url_normalization_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url(" https://api.tiingo.com/tiingo/daily/ "),
            "https://api.tiingo.com/tiingo/daily"
        );
    }

    #[test]
    fn missing_token_is_an_error() {
        // An explicitly blank token must surface as a config error no matter
        // what the ambient environment holds.
        let result = AppConfig::from_env(Some("https://example.com".into()), Some("  ".into()));
        assert!(result.is_err());
    }

    #[test]
    fn overrides_build_a_valid_config() {
        let config =
            AppConfig::from_env(Some("https://example.com/".into()), Some("token".into())).unwrap();
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.api_token, "token");
        assert!(config.requests_per_second >= 1);
        assert!(config.retry_attempts >= 1);
        assert!(!config.timeout.is_zero());
    }
}
