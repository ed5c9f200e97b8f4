//! Moving Average Convergence/Divergence

use serde::{Deserialize, Serialize};

use super::ema::ema;

/// EMA spans for MACD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// MACD output, every series aligned with the input closes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    /// Latest (macd, signal) pair
    pub fn latest(&self) -> Option<(f64, f64)> {
        Some((*self.macd.last()?, *self.signal.last()?))
    }
}

/// MACD line = EMA(fast) - EMA(slow); signal = EMA(MACD, signal)
pub fn macd(closes: &[f64], params: MacdParams) -> Macd {
    let fast = ema(closes, params.fast);
    let slow = ema(closes, params.slow);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, params.signal);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd {
        macd: line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_lengths() {
        let closes: Vec<f64> = (0..100_i32).map(|i| 50.0 + f64::from(i) * 0.3).collect();
        let out = macd(&closes, MacdParams::default());
        assert_eq!(out.macd.len(), 100);
        assert_eq!(out.signal.len(), 100);
        assert_eq!(out.histogram.len(), 100);
    }

    #[test]
    fn test_macd_starts_at_zero() {
        let out = macd(&[10.0, 12.0, 11.0], MacdParams::default());
        assert_eq!(out.macd[0], 0.0);
        assert_eq!(out.signal[0], 0.0);
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let out = macd(&[25.0; 40], MacdParams::default());
        assert!(out.macd.iter().all(|v| v.abs() < 1e-12));
        assert!(out.histogram.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let closes: Vec<f64> = (0..120_i32).map(|i| 100.0 + f64::from(i)).collect();
        let (line, signal) = macd(&closes, MacdParams::default()).latest().unwrap();
        assert!(line > 0.0);
        assert!(signal > 0.0);
        // the signal lags the line in a steady trend
        assert!(line >= signal);
    }

    #[test]
    fn test_macd_matches_ema_difference() {
        let closes: Vec<f64> = (0..30_i32).map(|i| (f64::from(i) * 0.9).sin() + 20.0).collect();
        let params = MacdParams {
            fast: 3,
            slow: 6,
            signal: 2,
        };
        let out = macd(&closes, params);
        let fast = ema(&closes, 3);
        let slow = ema(&closes, 6);
        for i in 0..closes.len() {
            assert!((out.macd[i] - (fast[i] - slow[i])).abs() < 1e-12);
        }
        assert_eq!(out.signal, ema(&out.macd, 2));
    }

    #[test]
    fn test_macd_empty() {
        let out = macd(&[], MacdParams::default());
        assert!(out.latest().is_none());
    }
}
