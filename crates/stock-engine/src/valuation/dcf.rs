//! Per-share discounted cash flow with a Gordon-growth terminal value
//!
//! Rates are expressed in percent (`10.0` means 10%), matching the inputs a
//! user types into the dashboard.

use serde::{Deserialize, Serialize};

/// Minimum gap (percentage points) kept between the discount rate and the
/// terminal growth rate.
pub const TERMINAL_SPREAD_PCT: f64 = 0.1;

/// Longest projection horizon accepted; longer horizons are clamped
pub const MAX_YEARS: u32 = 50;

/// Fraction of the last close used as the default starting FCF per share
const DEFAULT_FCF_YIELD: f64 = 0.05;

/// Inputs for [`dcf_value`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfParameters {
    /// Free cash flow per share for year 0
    pub start_fcf_per_share: f64,
    /// Annual growth for years 1..=N, percent
    pub growth_rate_pct: f64,
    /// Discount rate, percent
    pub discount_rate_pct: f64,
    /// Perpetual growth after year N, percent
    pub terminal_growth_pct: f64,
    /// Projection horizon in years
    pub years: u32,
}

impl Default for DcfParameters {
    fn default() -> Self {
        Self {
            start_fcf_per_share: 0.0,
            growth_rate_pct: 5.0,
            discount_rate_pct: 10.0,
            terminal_growth_pct: 2.5,
            years: 5,
        }
    }
}

/// One explicitly projected year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    pub year: u32,
    pub cash_flow: f64,
    pub present_value: f64,
}

/// Breakdown of a DCF run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub projections: Vec<ProjectedYear>,
    /// Terminal value at the end of year N, undiscounted
    pub terminal_value: f64,
    /// Terminal value discounted back to today
    pub terminal_present_value: f64,
    /// Terminal growth actually used, percent
    pub effective_terminal_growth_pct: f64,
    /// Whether terminal growth had to be pulled below the discount rate
    pub terminal_growth_clamped: bool,
    /// Intrinsic value per share, never negative
    pub intrinsic_value: f64,
}

impl DcfParameters {
    /// Default parameters with the starting FCF estimated as 5% of `last_price`
    pub fn from_last_price(last_price: f64) -> Self {
        Self {
            start_fcf_per_share: round_cents(last_price * DEFAULT_FCF_YIELD),
            ..Self::default()
        }
    }

    pub fn with_start_fcf(mut self, fcf_per_share: f64) -> Self {
        self.start_fcf_per_share = fcf_per_share;
        self
    }

    pub fn with_growth_rate(mut self, pct: f64) -> Self {
        self.growth_rate_pct = pct;
        self
    }

    pub fn with_discount_rate(mut self, pct: f64) -> Self {
        self.discount_rate_pct = pct;
        self
    }

    pub fn with_terminal_growth(mut self, pct: f64) -> Self {
        self.terminal_growth_pct = pct;
        self
    }

    /// Projection horizon, clamped to [`MAX_YEARS`]
    pub fn with_years(mut self, years: u32) -> Self {
        self.years = years.min(MAX_YEARS);
        self
    }

    /// Terminal growth after enforcing `discount > terminal`
    pub fn effective_terminal_growth(&self) -> (f64, bool) {
        if self.discount_rate_pct <= self.terminal_growth_pct {
            (self.discount_rate_pct - TERMINAL_SPREAD_PCT, true)
        } else {
            (self.terminal_growth_pct, false)
        }
    }

    /// Horizon actually projected
    pub fn effective_years(&self) -> u32 {
        self.years.min(MAX_YEARS)
    }

    /// Run the projection and return the full breakdown
    pub fn valuation(&self) -> DcfValuation {
        let (terminal_growth_pct, clamped) = self.effective_terminal_growth();
        let years = self.effective_years();

        let dr = self.discount_rate_pct / 100.0;
        let gr = self.growth_rate_pct / 100.0;
        let tg = terminal_growth_pct / 100.0;

        let mut projections = Vec::with_capacity(years as usize);
        let mut cash_flow = self.start_fcf_per_share;
        let mut present_value = 0.0;
        for year in 1..=years {
            cash_flow *= 1.0 + gr;
            let discounted = cash_flow / discount_factor(dr, year);
            present_value += discounted;
            projections.push(ProjectedYear {
                year,
                cash_flow,
                present_value: discounted,
            });
        }

        let terminal_value = cash_flow * (1.0 + tg) / (dr - tg);
        let terminal_present_value = terminal_value / discount_factor(dr, years);
        let total = present_value + terminal_present_value;

        DcfValuation {
            projections,
            terminal_value,
            terminal_present_value,
            effective_terminal_growth_pct: terminal_growth_pct,
            terminal_growth_clamped: clamped,
            intrinsic_value: if total.is_finite() { total.max(0.0) } else { 0.0 },
        }
    }
}

/// Intrinsic value per share; finite and never negative
pub fn dcf_value(params: &DcfParameters) -> f64 {
    params.valuation().intrinsic_value
}

fn discount_factor(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(i32::try_from(year).unwrap_or(i32::MAX))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DcfParameters {
        DcfParameters::default().with_start_fcf(5.0)
    }

    #[test]
    fn test_huge_horizon_is_clamped() {
        let valuation = reference().with_years(u32::MAX).valuation();
        assert_eq!(valuation.projections.len(), MAX_YEARS as usize);
        assert!(valuation.intrinsic_value.is_finite());

        let raw = DcfParameters {
            years: u32::MAX,
            ..reference()
        };
        assert_eq!(raw.effective_years(), MAX_YEARS);
        assert_eq!(dcf_value(&raw), dcf_value(&reference().with_years(MAX_YEARS)));
    }

    #[test]
    fn test_reference_value() {
        let value = dcf_value(&reference());
        assert!(value.is_finite());
        assert!((value - 75.942_750_665_938).abs() < 1e-9, "got {value}");
        // deterministic across runs
        assert_eq!(value.to_bits(), dcf_value(&reference()).to_bits());
    }

    #[test]
    fn test_breakdown_adds_up() {
        let valuation = reference().valuation();
        assert_eq!(valuation.projections.len(), 5);
        assert!((valuation.projections[0].cash_flow - 5.25).abs() < 1e-12);
        let explicit: f64 = valuation.projections.iter().map(|p| p.present_value).sum();
        assert!(
            (explicit + valuation.terminal_present_value - valuation.intrinsic_value).abs() < 1e-9
        );
        assert!(!valuation.terminal_growth_clamped);
    }

    #[test]
    fn test_increasing_fcf_increases_value() {
        let low = dcf_value(&reference().with_start_fcf(4.0));
        let mid = dcf_value(&reference().with_start_fcf(5.0));
        let high = dcf_value(&reference().with_start_fcf(6.0));
        assert!(low < mid && mid < high);
    }

    #[test]
    fn test_increasing_discount_rate_decreases_value() {
        let values: Vec<f64> = [6.0, 8.0, 10.0, 12.0, 15.0]
            .iter()
            .map(|&dr| dcf_value(&reference().with_discount_rate(dr)))
            .collect();
        assert!(values.windows(2).all(|w| w[0] > w[1]), "{values:?}");
    }

    #[test]
    fn test_discount_not_above_terminal_is_clamped() {
        let params = reference().with_discount_rate(2.0).with_terminal_growth(5.0);
        let valuation = params.valuation();
        assert!(valuation.terminal_growth_clamped);
        assert!((valuation.effective_terminal_growth_pct - 1.9).abs() < 1e-12);
        assert!(valuation.intrinsic_value.is_finite());
        assert!(valuation.intrinsic_value >= 0.0);

        let equal = reference().with_discount_rate(3.0).with_terminal_growth(3.0);
        assert!(dcf_value(&equal).is_finite());
    }

    #[test]
    fn test_zero_discount_rate_stays_finite() {
        let params = reference().with_discount_rate(0.0).with_terminal_growth(0.0);
        let value = dcf_value(&params);
        assert!(value.is_finite());
        assert!(value > 0.0);
    }

    #[test]
    fn test_never_negative() {
        let negative_fcf = reference().with_start_fcf(-3.0);
        assert_eq!(dcf_value(&negative_fcf), 0.0);

        let wiped_out = reference().with_discount_rate(-100.0);
        assert_eq!(dcf_value(&wiped_out), 0.0);

        assert_eq!(dcf_value(&DcfParameters::default()), 0.0);
    }

    #[test]
    fn test_zero_years_is_terminal_only() {
        let valuation = reference().with_years(0).valuation();
        assert!(valuation.projections.is_empty());
        let expected = 5.0 * 1.025 / (0.10 - 0.025);
        assert!((valuation.intrinsic_value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_from_last_price() {
        let params = DcfParameters::from_last_price(187.43);
        assert!((params.start_fcf_per_share - 9.37).abs() < 1e-12);
        assert_eq!(params.years, 5);
        assert_eq!(params.discount_rate_pct, 10.0);
    }
}
