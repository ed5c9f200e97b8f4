//! Cached facade over the configured market data collaborators

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::api::{FinnhubClient, YahooFinanceClient};
use crate::cache::{CacheKey, CacheManager};
use crate::config::{DataProvider, StockConfig};
use crate::error::Result;
use crate::model::{Fundamentals, NewsItem, PriceSeries};
use crate::source::{Fetched, FundamentalsSource, NewsSource, PriceHistorySource};

/// Routes history, news and fundamentals to their providers and caches
/// successful responses. Empty results are never cached.
#[derive(Clone)]
pub struct MarketData {
    history: Arc<dyn PriceHistorySource>,
    news: Arc<dyn NewsSource>,
    fundamentals: Arc<dyn FundamentalsSource>,
    caches: CacheManager,
}

impl MarketData {
    /// Assemble from explicit collaborators
    pub fn new(
        history: Arc<dyn PriceHistorySource>,
        news: Arc<dyn NewsSource>,
        fundamentals: Arc<dyn FundamentalsSource>,
        caches: CacheManager,
    ) -> Self {
        Self {
            history,
            news,
            fundamentals,
            caches,
        }
    }

    /// Build the provider stack described by `config`.
    ///
    /// News and fundamentals always go through Finnhub; history uses the
    /// configured provider.
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        config.validate()?;

        let finnhub = Arc::new(FinnhubClient::from_config(config)?);
        if !finnhub.has_api_key() {
            tracing::warn!("Finnhub API key missing; news and fundamentals will be empty");
        }

        let history: Arc<dyn PriceHistorySource> = match config.history_provider {
            DataProvider::Finnhub => finnhub.clone(),
            DataProvider::Yahoo => Arc::new(YahooFinanceClient::new(config.request_timeout)),
        };

        Ok(Self::new(
            history,
            finnhub.clone(),
            finnhub,
            CacheManager::from_config(config),
        ))
    }

    pub fn caches(&self) -> &CacheManager {
        &self.caches
    }
}

#[async_trait]
impl PriceHistorySource for MarketData {
    async fn price_history(&self, symbol: &str, days: u32) -> Fetched<PriceSeries> {
        let key = CacheKey::new(symbol, "history", json!({ "days": days }));
        if let Some(series) = self.caches.history.get_as::<PriceSeries>(&key).await {
            return Fetched::Data(series);
        }

        let fetched = self.history.price_history(symbol, days).await;
        if let Fetched::Data(series) = &fetched {
            if let Err(e) = self.caches.history.insert_as(key, series).await {
                tracing::warn!("{e}");
            }
        }
        fetched
    }
}

#[async_trait]
impl NewsSource for MarketData {
    async fn company_news(&self, symbol: &str, days: u32, limit: usize) -> Fetched<Vec<NewsItem>> {
        let key = CacheKey::new(symbol, "news", json!({ "days": days, "limit": limit }));
        if let Some(items) = self.caches.news.get_as::<Vec<NewsItem>>(&key).await {
            return Fetched::Data(items);
        }

        let fetched = self.news.company_news(symbol, days, limit).await;
        if let Fetched::Data(items) = &fetched {
            if let Err(e) = self.caches.news.insert_as(key, items).await {
                tracing::warn!("{e}");
            }
        }
        fetched
    }
}

#[async_trait]
impl FundamentalsSource for MarketData {
    async fn fundamentals(&self, symbol: &str) -> Fetched<Fundamentals> {
        let key = CacheKey::new(symbol, "fundamentals", json!({}));
        if let Some(fundamentals) = self.caches.fundamental.get_as::<Fundamentals>(&key).await {
            return Fetched::Data(fundamentals);
        }

        let fetched = self.fundamentals.fundamentals(symbol).await;
        if let Fetched::Data(fundamentals) = &fetched {
            if let Err(e) = self.caches.fundamental.insert_as(key, fundamentals).await {
                tracing::warn!("{e}");
            }
        }
        fetched
    }
}
