//! Exponential smoothing

use ta::{Next, indicators::ExponentialMovingAverage};

/// Exponential moving average with smoothing factor `2 / (span + 1)`.
///
/// The first output equals the first input and every later value only looks
/// at inputs up to its own index. A span of 0 is treated as 1, which returns
/// the input unchanged.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    match ExponentialMovingAverage::new(span.max(1)) {
        Ok(mut indicator) => values.iter().map(|&value| indicator.next(value)).collect(),
        Err(_) => ewm(values, 2.0 / (span.max(1) as f64 + 1.0)),
    }
}

/// First-value-seeded exponential smoother with an explicit `alpha`.
///
/// `alpha` is clamped into `(0, 1]`.
pub fn ewm(values: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = if alpha.is_finite() {
        alpha.clamp(f64::MIN_POSITIVE, 1.0)
    } else {
        1.0
    };

    let mut out = Vec::with_capacity(values.len());
    let mut current: Option<f64> = None;
    for &value in values {
        let next = match current {
            None => value,
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
        };
        current = Some(next);
        out.push(next);
    }
    out
}
