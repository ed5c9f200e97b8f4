//! Momentum and smoothing indicators over closing prices
//!
//! All functions are pure and return series aligned one-to-one with their
//! input, so callers can zip them with the bar dates for charting.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::{ema, ewm};
pub use macd::{Macd, MacdParams, macd};
pub use rsi::{DEFAULT_RSI_PERIOD, interpret_rsi, latest_rsi, rsi};
