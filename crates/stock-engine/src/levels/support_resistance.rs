//! Support/resistance detection from local extrema of closing prices

use serde::{Deserialize, Serialize};

/// Bars inspected on each side of a candidate
pub const DEFAULT_HALF_WINDOW: usize = 10;

/// Relative gap two retained levels must exceed (0.5%)
pub const DEFAULT_TOLERANCE: f64 = 0.005;

/// Deduplicated levels, both lists ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl SupportResistance {
    /// Highest support strictly below `price`
    pub fn nearest_support(&self, price: f64) -> Option<f64> {
        self.supports.iter().rev().copied().find(|&s| s < price)
    }

    /// Lowest resistance strictly above `price`
    pub fn nearest_resistance(&self, price: f64) -> Option<f64> {
        self.resistances.iter().copied().find(|&r| r > price)
    }
}

/// Scan `closes` for local minima (supports) and maxima (resistances).
///
/// Index `i` is a candidate when it has `half_window` bars on both sides and
/// its close is the min (or max) of `closes[i - half_window..=i + half_window]`.
/// A bar that is both (flat window) lands in both lists.
pub fn support_resistance(closes: &[f64], half_window: usize, tolerance: f64) -> SupportResistance {
    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    if closes.len() > 2 * half_window {
        for i in half_window..closes.len() - half_window {
            let window = &closes[i - half_window..=i + half_window];
            let (min, max) = window
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            let close = closes[i];
            if close == min {
                supports.push(close);
            }
            if close == max {
                resistances.push(close);
            }
        }
    }

    SupportResistance {
        supports: dedup_levels(supports, tolerance),
        resistances: dedup_levels(resistances, tolerance),
    }
}

/// Sort ascending and drop levels within `tolerance` (relative) of the last
/// retained one.
fn dedup_levels(mut levels: Vec<f64>, tolerance: f64) -> Vec<f64> {
    levels.retain(|v| v.is_finite());
    levels.sort_by(f64::total_cmp);

    let tolerance = tolerance.max(0.0);
    let mut kept: Vec<f64> = Vec::with_capacity(levels.len());
    for level in levels {
        match kept.last() {
            Some(&last) if (level - last).abs() <= tolerance * last.abs() => {}
            _ => kept.push(level),
        }
    }
    kept
}
