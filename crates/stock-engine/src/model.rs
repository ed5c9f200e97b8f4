//! Market data types shared by the indicators, valuation and screener

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Create a bar from its OHLCV components
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Date-ordered sequence of bars for one ticker.
///
/// Dates are strictly increasing; gaps (weekends, holidays) are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by date; when two bars share a date the later one in
    /// the input wins.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        // stable sort keeps input order among equal dates
        bars.sort_by_key(|bar| bar.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    /// Build a series from closing prices only, one bar per calendar day
    /// starting at `start`. Open/high/low are set to the close.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| PriceBar::new(date, close, close, close, close, 0.0))
            .collect();
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.low).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    /// The trailing `n` bars (all of them if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

impl FromIterator<PriceBar> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceBar>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A labelled price level, e.g. a Fibonacci retracement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub label: String,
    pub price: f64,
}

/// Company news headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub summary: String,
}

impl NewsItem {
    /// Publish time rendered as `YYYY-MM-DD HH:MM`
    pub fn published_label(&self) -> String {
        self.published_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Valuation multiples used by the screener
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe: Option<f64>,
    pub peg: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::new(vec![
            PriceBar::new(day(3), 1.0, 1.0, 1.0, 3.0, 10.0),
            PriceBar::new(day(1), 1.0, 1.0, 1.0, 1.0, 10.0),
            PriceBar::new(day(2), 1.0, 1.0, 1.0, 2.0, 10.0),
            PriceBar::new(day(2), 1.0, 1.0, 1.0, 2.5, 10.0),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.5, 3.0]);
        assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_from_closes_and_tail() {
        let series = PriceSeries::from_closes(day(1), &[10.0, 11.0, 12.0]);
        assert_eq!(series.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(series.last_close(), Some(12.0));
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 3);
        assert_eq!(series.highs(), series.lows());
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.last_close(), None);
        assert!(series.tail(5).is_empty());
    }

    #[test]
    fn test_news_published_label() {
        let item = NewsItem {
            headline: "Apple ships".to_string(),
            url: "https://example.com".to_string(),
            source: "Reuters".to_string(),
            published_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            summary: String::new(),
        };
        assert_eq!(item.published_label(), "2023-11-14 22:13");
    }
}
