//! Relative Strength Index with exponential (1/period) smoothing

use super::ema::ewm;

/// Default RSI lookback
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Stand-in for a zero average loss so the ratio stays finite
const LOSS_EPSILON: f64 = 1e-10;

/// RSI value reported for the first bar, which has no prior close
const NEUTRAL_RSI: f64 = 50.0;

/// Full RSI series, aligned with `closes`.
///
/// Gains and losses of consecutive closes are smoothed with `alpha = 1/period`
/// (seeded with the first difference). Values before index `period` are
/// warm-up bars: they are returned, but [`latest_rsi`] refuses to report a
/// value until the series is long enough.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }

    let period = period.max(1);
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let alpha = 1.0 / period as f64;
    let avg_gains = ewm(&gains, alpha);
    let avg_losses = ewm(&losses, alpha);

    let mut out = Vec::with_capacity(closes.len());
    out.push(NEUTRAL_RSI);
    out.extend(
        avg_gains
            .iter()
            .zip(&avg_losses)
            .map(|(&gain, &loss)| rsi_from_averages(gain, loss)),
    );
    out
}

/// Most recent RSI, or `None` while the series is still inside the warm-up
/// window (fewer than `period + 1` closes).
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period.max(1) + 1 {
        return None;
    }
    rsi(closes, period).last().copied()
}

/// Interpret an RSI reading
pub fn interpret_rsi(value: f64) -> &'static str {
    if value > 70.0 {
        "Overbought"
    } else if value < 30.0 {
        "Oversold"
    } else {
        "Neutral"
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let avg_loss = if avg_loss == 0.0 { LOSS_EPSILON } else { avg_loss };
    let ratio = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + ratio);
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        NEUTRAL_RSI
    }
}
