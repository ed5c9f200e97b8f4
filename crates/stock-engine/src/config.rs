//! Configuration for market data collaborators and the screener

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the Finnhub API key
pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";

/// Tickers screened when no universe is configured
pub const DEFAULT_UNIVERSE: [&str; 15] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "JPM", "V", "JNJ", "WMT", "PG", "XOM",
    "UNH", "HD",
];

/// Provider used for price history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataProvider {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Finnhub (requires API key)
    Finnhub,
}

/// Configuration for market data operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Provider used for OHLCV history
    pub history_provider: DataProvider,

    /// Cache TTL for price history
    pub cache_ttl_history: Duration,

    /// Cache TTL for fundamental data
    pub cache_ttl_fundamental: Duration,

    /// Cache TTL for news data
    pub cache_ttl_news: Duration,

    /// Timeout applied to every upstream request
    pub request_timeout: Duration,

    /// Finnhub request budget per minute
    pub rate_limit_per_minute: u32,

    /// Minimum spacing between per-ticker fetches in the screener
    pub screener_delay: Duration,

    /// Trailing window for company news, in days
    pub news_lookback_days: u32,

    /// Maximum number of news items returned
    pub news_limit: usize,

    /// Tickers the screener ranks
    pub universe: Vec<String>,

    /// Finnhub API key (optional)
    pub finnhub_api_key: Option<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            history_provider: DataProvider::Yahoo,
            cache_ttl_history: Duration::from_secs(60),         // 1 minute
            cache_ttl_fundamental: Duration::from_secs(3600),   // 1 hour
            cache_ttl_news: Duration::from_secs(300),           // 5 minutes
            request_timeout: Duration::from_secs(10),
            rate_limit_per_minute: 60,
            screener_delay: Duration::from_millis(250),
            news_lookback_days: 30,
            news_limit: 8,
            universe: DEFAULT_UNIVERSE.iter().map(ToString::to_string).collect(),
            finnhub_api_key: None,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load the Finnhub API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = env_api_key() {
            self.finnhub_api_key = Some(key);
        }
        self
    }

    /// Whether a Finnhub key is available
    pub fn has_finnhub_key(&self) -> bool {
        self.finnhub_api_key.is_some()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.history_provider == DataProvider::Finnhub && self.finnhub_api_key.is_none() {
            return Err(StockError::ConfigError(
                "Finnhub API key required when using the Finnhub history provider".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(StockError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.universe.is_empty() {
            return Err(StockError::ConfigError(
                "screener universe must contain at least one ticker".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_api_key() -> Option<String> {
    std::env::var(FINNHUB_API_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    history_provider: Option<DataProvider>,
    cache_ttl_history: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    screener_delay: Option<Duration>,
    news_lookback_days: Option<u32>,
    news_limit: Option<usize>,
    universe: Option<Vec<String>>,
    finnhub_api_key: Option<String>,
}

impl StockConfigBuilder {
    /// Set the price history provider
    pub fn history_provider(mut self, provider: DataProvider) -> Self {
        self.history_provider = Some(provider);
        self
    }

    /// Set cache TTL for price history
    pub fn cache_ttl_history(mut self, duration: Duration) -> Self {
        self.cache_ttl_history = Some(duration);
        self
    }

    /// Set cache TTL for fundamental data
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set cache TTL for news data
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the Finnhub request budget
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the spacing between screener fetches
    pub fn screener_delay(mut self, delay: Duration) -> Self {
        self.screener_delay = Some(delay);
        self
    }

    /// Set the news window in days
    pub fn news_lookback_days(mut self, days: u32) -> Self {
        self.news_lookback_days = Some(days);
        self
    }

    /// Set the maximum number of news items
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Replace the screener universe
    pub fn universe<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.universe = Some(
            tickers
                .into_iter()
                .map(|t| t.into().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        );
        self
    }

    /// Set Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Load Finnhub API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = env_api_key() {
            self.finnhub_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            history_provider: self.history_provider.unwrap_or(defaults.history_provider),
            cache_ttl_history: self.cache_ttl_history.unwrap_or(defaults.cache_ttl_history),
            cache_ttl_fundamental: self.cache_ttl_fundamental.unwrap_or(defaults.cache_ttl_fundamental),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self.rate_limit_per_minute.unwrap_or(defaults.rate_limit_per_minute),
            screener_delay: self.screener_delay.unwrap_or(defaults.screener_delay),
            news_lookback_days: self.news_lookback_days.unwrap_or(defaults.news_lookback_days),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            universe: self.universe.unwrap_or(defaults.universe),
            finnhub_api_key: self.finnhub_api_key.or(defaults.finnhub_api_key),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.history_provider, DataProvider::Yahoo);
        assert_eq!(config.universe.len(), 15);
        assert_eq!(config.news_limit, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .history_provider(DataProvider::Finnhub)
            .finnhub_api_key("test_key")
            .request_timeout(Duration::from_secs(5))
            .universe([" msft", "aapl ", ""])
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.universe, vec!["MSFT".to_string(), "AAPL".to_string()]);
        assert!(config.has_finnhub_key());
    }

    #[test]
    fn test_validation_finnhub_no_key() {
        let config = StockConfig {
            history_provider: DataProvider::Finnhub,
            finnhub_api_key: None,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let config = StockConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StockConfig {
            rate_limit_per_minute: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_universe() {
        let result = StockConfig::builder().universe(Vec::<String>::new()).build();
        assert!(matches!(result, Err(StockError::ConfigError(_))));
    }
}
