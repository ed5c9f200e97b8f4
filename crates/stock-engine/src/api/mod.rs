//! API clients for market data providers

pub mod finnhub;
pub mod yahoo;

pub use finnhub::{FinnhubClient, FinnhubNewsArticle};
pub use yahoo::YahooFinanceClient;
