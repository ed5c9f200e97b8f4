//! Collaborator boundary for external market data
//!
//! Providers return `Result` internally; at this boundary every failure is
//! folded into [`Fetched::Empty`] so callers never see an error, only an
//! explicit "no data" marker carrying the reason.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::error::{Result, StockError};
use crate::model::{Fundamentals, NewsItem, PriceSeries};

/// Why a collaborator came back empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyReason {
    /// No API key configured for the provider
    MissingCredentials,
    /// Unknown symbol or the provider had nothing for the window
    NoData,
    /// Upstream did not answer in time
    Timeout,
    /// Any other upstream failure
    Upstream(String),
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "API key not configured"),
            Self::NoData => write!(f, "no data for this symbol"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Upstream(message) => write!(f, "{message}"),
        }
    }
}

/// Result of a collaborator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fetched<T> {
    Data(T),
    Empty(EmptyReason),
}

impl<T> Fetched<T> {
    /// Fold a provider result into a `Fetched`, logging the failure
    pub fn from_result(symbol: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Data(value),
            Err(err) => {
                let reason = EmptyReason::from(&err);
                tracing::warn!(symbol, ?reason, "collaborator returned no data: {err}");
                Self::Empty(reason)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    /// The data, discarding the empty reason
    pub fn data(self) -> Option<T> {
        match self {
            Self::Data(value) => Some(value),
            Self::Empty(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Data(value) => Fetched::Data(f(value)),
            Self::Empty(reason) => Fetched::Empty(reason),
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The data, or the type's empty value
    pub fn unwrap_or_empty(self) -> T {
        self.data().unwrap_or_default()
    }
}

impl From<&StockError> for EmptyReason {
    fn from(err: &StockError) -> Self {
        match err {
            StockError::MissingCredentials(_) => Self::MissingCredentials,
            StockError::DataUnavailable { .. } => Self::NoData,
            StockError::Timeout { .. } => Self::Timeout,
            StockError::NetworkError(e) if e.is_timeout() => Self::Timeout,
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Supplies daily OHLCV history
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// History for roughly the last `days` calendar days
    async fn price_history(&self, symbol: &str, days: u32) -> Fetched<PriceSeries>;
}

/// Supplies company news
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// News over the trailing `days`, newest first, at most `limit` items
    async fn company_news(&self, symbol: &str, days: u32, limit: usize) -> Fetched<Vec<NewsItem>>;
}

/// Supplies valuation multiples
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn fundamentals(&self, symbol: &str) -> Fetched<Fundamentals>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_ok() {
        let fetched = Fetched::from_result("AAPL", Ok(3));
        assert_eq!(fetched, Fetched::Data(3));
        assert_eq!(fetched.data(), Some(3));
    }

    #[test]
    fn test_from_result_maps_reasons() {
        let fetched: Fetched<u8> =
            Fetched::from_result("AAPL", Err(StockError::MissingCredentials("KEY".into())));
        assert_eq!(fetched, Fetched::Empty(EmptyReason::MissingCredentials));

        let fetched: Fetched<u8> =
            Fetched::from_result("ZZZZ", Err(StockError::unavailable("ZZZZ", "no candles")));
        assert_eq!(fetched, Fetched::Empty(EmptyReason::NoData));

        let fetched: Fetched<u8> = Fetched::from_result(
            "AAPL",
            Err(StockError::Timeout {
                provider: "Yahoo Finance".into(),
            }),
        );
        assert_eq!(fetched, Fetched::Empty(EmptyReason::Timeout));

        let fetched: Fetched<u8> =
            Fetched::from_result("AAPL", Err(StockError::ApiError("500".into())));
        assert!(matches!(fetched, Fetched::Empty(EmptyReason::Upstream(msg)) if msg.contains("500")));
    }

    #[test]
    fn test_unwrap_or_empty() {
        let fetched: Fetched<Vec<NewsItem>> = Fetched::Empty(EmptyReason::NoData);
        assert!(fetched.is_empty());
        assert!(fetched.unwrap_or_empty().is_empty());

        let fetched = Fetched::Data(vec![1, 2]).map(|v| v.len());
        assert_eq!(fetched.unwrap_or_empty(), 2);
    }

    #[tokio::test]
    async fn test_mock_source_is_object_safe() {
        let mut mock = MockPriceHistorySource::new();
        mock.expect_price_history()
            .returning(|_, _| Fetched::Empty(EmptyReason::NoData));

        let source: Box<dyn PriceHistorySource> = Box::new(mock);
        assert!(source.price_history("AAPL", 30).await.is_empty());
    }
}
