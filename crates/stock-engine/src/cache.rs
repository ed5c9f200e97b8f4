//! Caching layer for collaborator responses to reduce API calls

use cached::{Cached, TimedCache};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::{Result, StockError};

/// Cache key for market data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// Stock symbol
    pub symbol: String,
    /// Collaborator call, e.g. `history` or `news`
    pub endpoint: String,
    /// Additional parameters as JSON string
    pub params: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(symbol: impl Into<String>, endpoint: impl Into<String>, params: impl Serialize) -> Self {
        Self {
            symbol: symbol.into(),
            endpoint: endpoint.into(),
            params: serde_json::to_string(&params).unwrap_or_default(),
        }
    }
}

/// Thread-safe TTL cache holding JSON values
pub struct StockCache {
    cache: Arc<RwLock<TimedCache<CacheKey, serde_json::Value>>>,
}

impl StockCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a raw value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a raw value into the cache
    pub async fn insert(&self, key: CacheKey, value: serde_json::Value) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get a value and decode it into `T`.
    ///
    /// An entry that no longer decodes is evicted and reported as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let Some(value) = self.get(key).await else {
            tracing::debug!("Cache miss for key: {:?}", key);
            return None;
        };

        match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::debug!("Cache hit for key: {:?}", key);
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!("Evicting undecodable cache entry {:?}: {}", key, e);
                self.invalidate(key).await;
                None
            }
        }
    }

    /// Encode `value` as JSON and insert it
    pub async fn insert_as<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)
            .map_err(|e| StockError::CacheError(format!("failed to encode {key:?}: {e}")))?;
        self.insert(key, encoded).await;
        Ok(())
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for StockCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// One cache per collaborator kind, each with its own TTL
#[derive(Clone)]
pub struct CacheManager {
    /// Price history, short TTL
    pub history: StockCache,
    /// Fundamental data, long TTL
    pub fundamental: StockCache,
    /// News, medium TTL
    pub news: StockCache,
}

impl CacheManager {
    /// Create a new cache manager with specified TTLs
    pub fn new(history_ttl: Duration, fundamental_ttl: Duration, news_ttl: Duration) -> Self {
        Self {
            history: StockCache::new(history_ttl),
            fundamental: StockCache::new(fundamental_ttl),
            news: StockCache::new(news_ttl),
        }
    }

    /// Create a cache manager from the TTLs in a config
    pub fn from_config(config: &crate::config::StockConfig) -> Self {
        Self::new(
            config.cache_ttl_history,
            config.cache_ttl_fundamental,
            config.cache_ttl_news,
        )
    }

    /// Clear all caches
    pub async fn clear_all(&self) {
        self.history.clear().await;
        self.fundamental.clear().await;
        self.news.clear().await;
    }
}
