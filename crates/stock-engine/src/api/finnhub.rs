//! Finnhub client for candles, company news and basic financials

use crate::error::{Result, StockError};
use crate::model::{Fundamentals, NewsItem, PriceBar, PriceSeries};
use crate::source::{Fetched, FundamentalsSource, NewsSource, PriceHistorySource};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Article category
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    /// News headline
    #[serde(default)]
    pub headline: String,
    /// Unique article ID
    #[serde(default)]
    pub id: i64,
    /// Related symbols
    #[serde(default)]
    pub related: String,
    /// News source
    #[serde(default)]
    pub source: String,
    /// Article summary
    #[serde(default)]
    pub summary: String,
    /// Article URL
    #[serde(default)]
    pub url: String,
}

/// Daily candle arrays as returned by `/stock/candle`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandleResponse {
    /// `ok` or `no_data`
    pub s: String,
    #[serde(default)]
    pub t: Vec<i64>,
    #[serde(default)]
    pub o: Vec<f64>,
    #[serde(default)]
    pub h: Vec<f64>,
    #[serde(default)]
    pub l: Vec<f64>,
    #[serde(default)]
    pub c: Vec<f64>,
    #[serde(default)]
    pub v: Vec<f64>,
}

/// `/stock/metric?metric=all` payload; only the flat metric map is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricResponse {
    #[serde(default)]
    pub metric: HashMap<String, serde_json::Value>,
}

/// Finnhub REST client with rate limiting and a request timeout
pub struct FinnhubClient {
    client: Client,
    api_key: Option<String>,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key; calls without one come back empty
    /// * `rate_limit` - Requests per minute (free tier: 60)
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: Option<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
            rate_limiter,
        })
    }

    /// Create a client from the shared configuration
    pub fn from_config(config: &crate::config::StockConfig) -> Result<Self> {
        Self::new(
            config.finnhub_api_key.clone(),
            config.rate_limit_per_minute,
            config.request_timeout,
        )
    }

    /// Whether an API key was supplied
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StockError::MissingCredentials(crate::config::FINNHUB_API_KEY_ENV.to_string()))?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .query(query)
            .query(&[("token", api_key)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StockError::Timeout {
                        provider: PROVIDER.to_string(),
                    }
                } else {
                    StockError::ApiError(format!("Finnhub request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StockError::ApiError(format!("Failed to parse Finnhub response: {e}")))
    }

    /// Daily candles between two instants
    pub async fn get_candles(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let response: CandleResponse = self
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", "D".to_string()),
                    ("from", from.timestamp().to_string()),
                    ("to", to.timestamp().to_string()),
                ],
            )
            .await?;

        candles_to_series(symbol, &response)
    }

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Stock symbol (e.g., "AAPL")
    /// * `from` - Start date (YYYY-MM-DD)
    /// * `to` - End date (YYYY-MM-DD)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.get_json(
            "/company-news",
            &[
                ("symbol", symbol.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ],
        )
        .await
    }

    /// Basic financials (`metric=all`)
    pub async fn get_basic_financials(&self, symbol: &str) -> Result<Fundamentals> {
        let response: MetricResponse = self
            .get_json(
                "/stock/metric",
                &[("symbol", symbol.to_string()), ("metric", "all".to_string())],
            )
            .await?;

        Ok(metrics_to_fundamentals(&response))
    }
}

/// Convert candle arrays into a series, rejecting `no_data` and ragged arrays
pub fn candles_to_series(symbol: &str, candles: &CandleResponse) -> Result<PriceSeries> {
    if candles.s != "ok" || candles.t.is_empty() {
        return Err(StockError::unavailable(symbol, format!("candle status `{}`", candles.s)));
    }

    let n = candles.t.len();
    if [candles.o.len(), candles.h.len(), candles.l.len(), candles.c.len()]
        .iter()
        .any(|&len| len != n)
    {
        return Err(StockError::ApiError(format!(
            "Finnhub returned mismatched candle arrays for {symbol}"
        )));
    }

    Ok(candles
        .t
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PriceBar::new(
                date,
                candles.o[i],
                candles.h[i],
                candles.l[i],
                candles.c[i],
                candles.v.get(i).copied().unwrap_or(0.0),
            ))
        })
        .collect())
}

/// Pull PE and PEG out of the metric map.
///
/// Only a positive PE is kept (loss-makers have none). PEG is derived from it
/// and five-year EPS growth; it is left empty when growth is missing or not
/// positive.
pub fn metrics_to_fundamentals(response: &MetricResponse) -> Fundamentals {
    let metric = |name: &str| response.metric.get(name).and_then(serde_json::Value::as_f64);

    let pe = metric("peTTM")
        .or_else(|| metric("peBasicExclExtraTTM"))
        .filter(|pe| pe.is_finite() && *pe > 0.0);
    let peg = pe
        .zip(metric("epsGrowth5Y"))
        .and_then(|(pe, growth)| (growth > 0.0).then_some(pe / growth));

    Fundamentals { pe, peg }
}

/// Newest-first news items, at most `limit`
pub fn articles_to_news(mut articles: Vec<FinnhubNewsArticle>, limit: usize) -> Vec<NewsItem> {
    articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    articles
        .into_iter()
        .filter_map(|article| {
            let published_at = DateTime::from_timestamp(article.datetime, 0)?;
            let headline = if article.headline.trim().is_empty() {
                "No headline".to_string()
            } else {
                article.headline
            };
            Some(NewsItem {
                headline,
                url: article.url,
                source: article.source,
                published_at,
                summary: article.summary,
            })
        })
        .take(limit)
        .collect()
}

#[async_trait]
impl PriceHistorySource for FinnhubClient {
    async fn price_history(&self, symbol: &str, days: u32) -> Fetched<PriceSeries> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(i64::from(days.max(1)));
        Fetched::from_result(symbol, self.get_candles(symbol, from, to).await)
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    async fn company_news(&self, symbol: &str, days: u32, limit: usize) -> Fetched<Vec<NewsItem>> {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(i64::from(days));
        let result = self
            .get_company_news(
                symbol,
                &from.format("%Y-%m-%d").to_string(),
                &to.format("%Y-%m-%d").to_string(),
            )
            .await
            .map(|articles| articles_to_news(articles, limit));
        Fetched::from_result(symbol, result)
    }
}

#[async_trait]
impl FundamentalsSource for FinnhubClient {
    async fn fundamentals(&self, symbol: &str) -> Fetched<Fundamentals> {
        Fetched::from_result(symbol, self.get_basic_financials(symbol).await)
    }
}
