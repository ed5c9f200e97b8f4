//! Fibonacci retracement levels over a trailing window

use serde::{Deserialize, Serialize};

use crate::model::{Level, PriceBar};

/// Default trailing window in bars
pub const DEFAULT_FIB_LOOKBACK: usize = 180;

/// Canonical retracement ratios, in output order
pub const FIB_RATIOS: [(&str, f64); 7] = [
    ("0%", 0.0),
    ("23.6%", 0.236),
    ("38.2%", 0.382),
    ("50%", 0.5),
    ("61.8%", 0.618),
    ("78.6%", 0.786),
    ("100%", 1.0),
];

/// Retracement levels keyed by label, kept in canonical ratio order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FibonacciLevels {
    levels: Vec<Level>,
}

impl FibonacciLevels {
    /// Price for an exact label such as `"61.8%"`
    pub fn get(&self, label: &str) -> Option<f64> {
        self.levels
            .iter()
            .find(|level| level.label == label)
            .map(|level| level.price)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Swing high the levels were measured from
    pub fn high(&self) -> Option<f64> {
        self.get("0%")
    }

    /// Swing low the levels were measured from
    pub fn low(&self) -> Option<f64> {
        self.get("100%")
    }
}

/// Levels between the max high and min low of the last `lookback` bars.
///
/// The window is clipped to the series length and always includes at least
/// the final bar. An empty input yields no levels.
pub fn fibonacci_levels(bars: &[PriceBar], lookback: usize) -> FibonacciLevels {
    let window = &bars[bars.len().saturating_sub(lookback.max(1))..];
    if window.is_empty() {
        return FibonacciLevels::default();
    }

    let high = window.iter().map(|bar| bar.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min);
    let range = high - low;

    FibonacciLevels {
        levels: FIB_RATIOS
            .iter()
            .map(|&(label, ratio)| Level {
                label: label.to_string(),
                price: high - range * ratio,
            })
            .collect(),
    }
}
