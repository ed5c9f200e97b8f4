//! Yahoo Finance history client (no API key required)

use crate::error::{Result, StockError};
use crate::model::{PriceBar, PriceSeries};
use crate::source::{Fetched, PriceHistorySource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Get daily bars between two instants
    pub async fn get_historical_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = tokio::time::timeout(
            self.timeout,
            provider.get_quote_history(symbol, start_odt, end_odt),
        )
        .await
        .map_err(|_| StockError::Timeout {
            provider: PROVIDER.to_string(),
        })?
        .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let series: PriceSeries = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar::new(
                    date,
                    q.open,
                    q.high,
                    q.low,
                    q.close,
                    q.volume as f64,
                ))
            })
            .collect();

        if series.is_empty() {
            return Err(StockError::unavailable(symbol, "no quotes in range"));
        }
        Ok(series)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl PriceHistorySource for YahooFinanceClient {
    async fn price_history(&self, symbol: &str, days: u32) -> Fetched<PriceSeries> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(days.max(1)));
        Fetched::from_result(symbol, self.get_historical_bars(symbol, start, end).await)
    }
}
