//! Indicator, valuation and screener engine
//!
//! This crate turns daily price history into a trading view of a ticker and
//! ranks a universe of tickers. It includes:
//!
//! - Indicators: EMA, Wilder-style RSI, MACD
//! - Price levels: rolling-window support/resistance, Fibonacci retracement
//! - Per-share DCF valuation with a Gordon-growth terminal value
//! - A screener combining RSI, trend distance, PE and PEG into one score
//! - Cached, rate-limited market data from Yahoo Finance and Finnhub
//!
//! Indicator, level and valuation code is pure; network access lives behind
//! the [`PriceHistorySource`], [`NewsSource`] and [`FundamentalsSource`]
//! traits, which never fail and instead return [`Fetched::Empty`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_engine::{AnalysisParams, MarketData, PriceHistorySource, StockConfig, analyze};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::default().with_env_api_key();
//!     let market = MarketData::from_config(&config)?;
//!
//!     let series = market.price_history("AAPL", 365).await.unwrap_or_empty();
//!     if let Some(report) = analyze("AAPL", &series, &AnalysisParams::default()) {
//!         for bullet in report.summary() {
//!             println!("- {bullet}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod market;
pub mod model;
pub mod screener;
pub mod source;
pub mod valuation;

// Re-export main types for convenience
pub use analysis::{AnalysisParams, AnalysisReport, ChartSeries, Verdict, analyze};
pub use cache::{CacheManager, StockCache};
pub use config::{DataProvider, StockConfig};
pub use error::{Result, StockError};
pub use market::MarketData;
pub use model::{Fundamentals, Level, NewsItem, PriceBar, PriceSeries};
pub use screener::{Candidate, ScoreWeights, Screener, ScreenerCriteria, ScreenerRow};
pub use source::{EmptyReason, Fetched, FundamentalsSource, NewsSource, PriceHistorySource};
pub use valuation::{DcfParameters, DcfValuation, MAX_YEARS, dcf_value};
