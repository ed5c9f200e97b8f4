//! Single-ticker technical and valuation report

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::indicators::{DEFAULT_RSI_PERIOD, MacdParams, interpret_rsi, latest_rsi, macd, rsi};
use crate::levels::{
    DEFAULT_FIB_LOOKBACK, DEFAULT_HALF_WINDOW, DEFAULT_TOLERANCE, FibonacciLevels,
    fibonacci_levels, support_resistance,
};
use crate::model::PriceSeries;
use crate::valuation::{DcfParameters, DcfValuation};

/// Knobs for [`analyze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub fib_lookback: usize,
    pub sr_half_window: usize,
    pub sr_tolerance: f64,
    pub rsi_period: usize,
    pub macd: MacdParams,
    /// DCF inputs; `start_fcf_per_share` is ignored when `fcf_per_share` is `None`
    pub dcf: DcfParameters,
    /// Starting FCF per share. Defaults to 5% of the last close.
    pub fcf_per_share: Option<f64>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fib_lookback: DEFAULT_FIB_LOOKBACK,
            sr_half_window: DEFAULT_HALF_WINDOW,
            sr_tolerance: DEFAULT_TOLERANCE,
            rsi_period: DEFAULT_RSI_PERIOD,
            macd: MacdParams::default(),
            dcf: DcfParameters::default(),
            fcf_per_share: None,
        }
    }
}

/// Intrinsic value relative to the last price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Discount,
    Premium,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discount => write!(f, "discount"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

/// Series aligned by index, ready for plotting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub last_price: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
    pub fibonacci: FibonacciLevels,
    pub dcf_inputs: DcfParameters,
    pub dcf: DcfValuation,
    pub verdict: Verdict,
    pub chart: ChartSeries,
}

impl AnalysisReport {
    pub fn intrinsic_value(&self) -> f64 {
        self.dcf.intrinsic_value
    }

    /// RSI zone label, if RSI has settled
    pub fn rsi_zone(&self) -> Option<&'static str> {
        self.rsi.map(interpret_rsi)
    }

    /// Plain-English trading plan bullets
    pub fn summary(&self) -> Vec<String> {
        let mut bullets = Vec::new();

        if let Some(shallow) = self.fibonacci.get("38.2%") {
            let mut line = format!("Pullback entry near Fib 38.2% ≈ {}", usd(shallow));
            if let Some(deep) = self.fibonacci.get("61.8%") {
                line.push_str(&format!("; deeper value near 61.8% ≈ {}", usd(deep)));
            }
            line.push('.');
            bullets.push(line);
        }
        if let Some(support) = self.nearest_support {
            bullets.push(format!(
                "Nearest support: {} (place stop slightly below).",
                usd(support)
            ));
        }
        if let Some(resistance) = self.nearest_resistance {
            bullets.push(format!("First target/trim zone: {}.", usd(resistance)));
        }
        bullets.push(format!(
            "DCF suggests a {} vs. price (intrinsic {} vs. {}).",
            self.verdict,
            usd(self.dcf.intrinsic_value),
            usd(self.last_price)
        ));

        bullets
    }
}

/// Run every indicator and the DCF over `series`.
///
/// Returns `None` for an empty series.
pub fn analyze(symbol: &str, series: &PriceSeries, params: &AnalysisParams) -> Option<AnalysisReport> {
    let last_bar = series.bars().last()?;
    let last_price = last_bar.close;
    let closes = series.closes();

    let rsi_series = rsi(&closes, params.rsi_period);
    let macd_series = macd(&closes, params.macd);
    let (macd_latest, signal_latest) = macd_series.latest().unzip();

    let levels = support_resistance(&closes, params.sr_half_window, params.sr_tolerance);
    let fibonacci = fibonacci_levels(series.bars(), params.fib_lookback);

    let dcf_inputs = match params.fcf_per_share {
        Some(fcf) => params.dcf.with_start_fcf(fcf),
        None => params
            .dcf
            .with_start_fcf(DcfParameters::from_last_price(last_price).start_fcf_per_share),
    };
    let dcf = dcf_inputs.valuation();
    let verdict = if dcf.intrinsic_value > last_price {
        Verdict::Discount
    } else {
        Verdict::Premium
    };

    tracing::debug!(
        %symbol,
        bars = series.len(),
        intrinsic = dcf.intrinsic_value,
        %verdict,
        "analysis complete"
    );

    Some(AnalysisReport {
        symbol: symbol.to_uppercase(),
        as_of: last_bar.date,
        last_price,
        rsi: latest_rsi(&closes, params.rsi_period),
        macd: macd_latest,
        macd_signal: signal_latest,
        nearest_support: levels.nearest_support(last_price),
        nearest_resistance: levels.nearest_resistance(last_price),
        supports: levels.supports,
        resistances: levels.resistances,
        fibonacci,
        dcf_inputs,
        dcf,
        verdict,
        chart: ChartSeries {
            dates: series.dates(),
            closes,
            rsi: rsi_series,
            macd: macd_series.macd,
            signal: macd_series.signal,
        },
    })
}

/// `$1,234.56`
pub fn usd(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    /// Oscillating series with a mild uptrend
    fn wave(n: i32) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + f64::from(i) * 0.1 + 10.0 * (f64::from(i) / 8.0).sin())
            .collect();
        PriceSeries::from_closes(start(), &closes)
    }

    #[test]
    fn test_empty_series_has_no_report() {
        assert!(analyze("AAPL", &PriceSeries::default(), &AnalysisParams::default()).is_none());
    }

    #[test]
    fn test_report_contents() {
        let series = wave(250);
        let report = analyze("aapl", &series, &AnalysisParams::default()).unwrap();

        assert_eq!(report.symbol, "AAPL");
        assert_eq!(report.last_price, series.last_close().unwrap());
        assert_eq!(report.chart.closes.len(), 250);
        assert_eq!(report.chart.rsi.len(), 250);
        assert_eq!(report.chart.macd.len(), 250);
        assert_eq!(report.chart.dates.len(), 250);
        assert!(report.rsi.is_some());
        assert!(report.macd.is_some());
        assert_eq!(report.fibonacci.len(), 7);
        assert!(!report.supports.is_empty());
        assert!(!report.resistances.is_empty());

        if let Some(support) = report.nearest_support {
            assert!(support < report.last_price);
        }
        if let Some(resistance) = report.nearest_resistance {
            assert!(resistance > report.last_price);
        }
    }

    #[test]
    fn test_default_fcf_is_five_percent_of_price() {
        let series = PriceSeries::from_closes(start(), &[200.0; 30]);
        let report = analyze("FLAT", &series, &AnalysisParams::default()).unwrap();
        assert!((report.dcf_inputs.start_fcf_per_share - 10.0).abs() < 1e-9);
        // 5% FCF yield with 5% growth at 10% discount is worth less than the price
        assert_eq!(report.verdict, Verdict::Premium);
    }

    #[test]
    fn test_explicit_fcf_and_discount_verdict() {
        let series = PriceSeries::from_closes(start(), &[20.0; 30]);
        let params = AnalysisParams {
            fcf_per_share: Some(5.0),
            ..AnalysisParams::default()
        };
        let report = analyze("CHEAP", &series, &params).unwrap();
        assert!((report.intrinsic_value() - 75.942_750_665_938).abs() < 1e-9);
        assert_eq!(report.verdict, Verdict::Discount);
    }

    #[test]
    fn test_short_series_rsi_warmup() {
        let series = PriceSeries::from_closes(start(), &[10.0, 11.0, 12.0]);
        let report = analyze("NEW", &series, &AnalysisParams::default()).unwrap();
        assert!(report.rsi.is_none());
        assert!(report.rsi_zone().is_none());
        assert_eq!(report.chart.rsi.len(), 3);
        assert!(report.supports.is_empty());
    }

    #[test]
    fn test_summary_bullets() {
        let series = wave(250);
        let report = analyze("WAVE", &series, &AnalysisParams::default()).unwrap();
        let bullets = report.summary();

        assert!(bullets[0].starts_with("Pullback entry near Fib 38.2%"));
        assert!(bullets[0].contains("61.8%"));
        let dcf_line = bullets.last().unwrap();
        assert!(dcf_line.starts_with("DCF suggests a"));
        assert!(dcf_line.contains(&report.verdict.to_string()));
    }

    #[test]
    fn test_usd_formatting() {
        assert_eq!(usd(0.0), "$0.00");
        assert_eq!(usd(9.375), "$9.38");
        assert_eq!(usd(1234.5), "$1,234.50");
        assert_eq!(usd(1_234_567.891), "$1,234,567.89");
        assert_eq!(usd(-42.0), "-$42.00");
    }
}
