//! Screener: score a ticker universe on momentum and valuation, filter, rank
//!
//! Scoring and ranking are pure; [`Screener`] wraps them with throttled,
//! sequential fetches through the collaborator traits.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::indicators::{DEFAULT_RSI_PERIOD, ema, latest_rsi};
use crate::model::{Fundamentals, PriceSeries};
use crate::source::{Fetched, FundamentalsSource, PriceHistorySource};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Span of the long moving average used for the distance term
pub const DEFAULT_LONG_EMA_SPAN: usize = 200;

/// One ticker's inputs
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub ticker: String,
    pub series: PriceSeries,
    pub fundamentals: Option<Fundamentals>,
}

/// One ranked output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub ticker: String,
    pub last_price: f64,
    pub rsi: f64,
    /// Last close relative to its long EMA, percent (negative = below)
    pub ema_distance_pct: Option<f64>,
    pub score: f64,
    pub pe: Option<f64>,
    pub peg: Option<f64>,
}

/// Weights of the linear score; lower scores rank first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// RSI level considered most attractive
    pub oversold_target: f64,
    pub rsi: f64,
    pub ema_distance: f64,
    pub pe: f64,
    pub peg: f64,
    /// PE charged when none is known, so a missing multiple never beats a real one
    pub missing_pe: f64,
    /// PEG charged when none is known
    pub missing_peg: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            oversold_target: 30.0,
            rsi: 1.0,
            ema_distance: 0.5,
            pe: 0.5,
            peg: 5.0,
            missing_pe: 25.0,
            missing_peg: 2.0,
        }
    }
}

/// Thresholds and shape of a screener run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerCriteria {
    pub max_rsi: Option<f64>,
    pub max_pe: Option<f64>,
    pub max_peg: Option<f64>,
    /// Maximum allowed distance from the long EMA, percent (e.g. `-5.0`
    /// keeps only names at least 5% below it)
    pub max_ema_distance_pct: Option<f64>,
    pub top_n: usize,
    pub rsi_period: usize,
    pub ema_span: usize,
    /// Calendar days of history fetched per ticker
    pub history_days: u32,
    pub weights: ScoreWeights,
}

impl Default for ScreenerCriteria {
    fn default() -> Self {
        Self {
            max_rsi: Some(55.0),
            max_pe: Some(30.0),
            max_peg: Some(2.0),
            max_ema_distance_pct: None,
            top_n: 15,
            rsi_period: DEFAULT_RSI_PERIOD,
            ema_span: DEFAULT_LONG_EMA_SPAN,
            history_days: 365,
            weights: ScoreWeights::default(),
        }
    }
}

impl ScreenerCriteria {
    /// Whether a scored row passes every configured threshold.
    ///
    /// A missing PE/PEG/EMA distance never fails its threshold.
    pub fn passes(&self, row: &ScreenerRow) -> bool {
        within(Some(row.rsi), self.max_rsi)
            && within(row.pe, self.max_pe)
            && within(row.peg, self.max_peg)
            && within(row.ema_distance_pct, self.max_ema_distance_pct)
    }
}

fn within(value: Option<f64>, max: Option<f64>) -> bool {
    match (value, max) {
        (Some(value), Some(max)) => value <= max,
        _ => true,
    }
}

/// Score one candidate.
///
/// Returns `None` for an empty series or when the series is too short for a
/// settled RSI reading.
pub fn score_candidate(candidate: &Candidate, criteria: &ScreenerCriteria) -> Option<ScreenerRow> {
    let closes = candidate.series.closes();
    let last_price = *closes.last()?;
    let Some(rsi) = latest_rsi(&closes, criteria.rsi_period) else {
        tracing::debug!(ticker = %candidate.ticker, bars = closes.len(), "RSI still warming up, not scored");
        return None;
    };

    let long_ema = ema(&closes, criteria.ema_span).last().copied();
    let ema_distance_pct = long_ema
        .filter(|&avg| avg != 0.0)
        .map(|avg| (last_price - avg) / avg * 100.0);

    // loss-makers have no meaningful multiple
    let fundamentals = candidate.fundamentals.unwrap_or_default();
    let pe = fundamentals.pe.filter(|&pe| pe > 0.0 && pe.is_finite());
    let peg = fundamentals.peg.filter(|&peg| peg > 0.0 && peg.is_finite());
    let weights = &criteria.weights;

    let mut score = weights.rsi * (rsi - weights.oversold_target).abs();
    if let Some(distance) = ema_distance_pct {
        score += weights.ema_distance * distance;
    }
    score += weights.pe * pe.unwrap_or(weights.missing_pe);
    score += weights.peg * peg.unwrap_or(weights.missing_peg);

    Some(ScreenerRow {
        ticker: candidate.ticker.clone(),
        last_price,
        rsi,
        ema_distance_pct,
        score,
        pe,
        peg,
    })
}

/// Filter, sort and truncate scored rows.
///
/// When no row passes the filter the unfiltered rows are ranked instead, so a
/// non-empty input always yields a non-empty result (unless `top_n` is 0).
pub fn rank(rows: Vec<ScreenerRow>, criteria: &ScreenerCriteria) -> Vec<ScreenerRow> {
    let (passing, rejected): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|row| criteria.passes(row));

    let mut ranked = if passing.is_empty() && !rejected.is_empty() {
        tracing::info!(
            candidates = rejected.len(),
            "no candidate passed the filters; showing best-scored instead"
        );
        rejected
    } else {
        passing
    };

    ranked.sort_by(compare_rows);
    ranked.truncate(criteria.top_n);
    ranked
}

/// Score, then PE (missing last), then RSI, then ticker
fn compare_rows(a: &ScreenerRow, b: &ScreenerRow) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| match (a.pe, b.pe) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.rsi.total_cmp(&b.rsi))
        .then_with(|| a.ticker.cmp(&b.ticker))
}

/// Score every candidate, dropping those still in RSI warm-up
pub fn score_all(candidates: &[Candidate], criteria: &ScreenerCriteria) -> Vec<ScreenerRow> {
    candidates
        .iter()
        .filter_map(|candidate| score_candidate(candidate, criteria))
        .collect()
}

/// Score every candidate and rank the results
pub fn screen(candidates: &[Candidate], criteria: &ScreenerCriteria) -> Vec<ScreenerRow> {
    rank(score_all(candidates, criteria), criteria)
}

/// Fetches a universe through the collaborators and ranks it
pub struct Screener {
    history: Arc<dyn PriceHistorySource>,
    fundamentals: Option<Arc<dyn FundamentalsSource>>,
    throttle: SharedRateLimiter,
}

impl Screener {
    /// Create a screener that waits at least `delay` between per-ticker fetches
    pub fn new(history: Arc<dyn PriceHistorySource>, delay: Duration) -> Self {
        let quota = Quota::with_period(delay)
            .unwrap_or_else(|| Quota::per_second(std::num::NonZeroU32::MAX));
        Self {
            history,
            fundamentals: None,
            throttle: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Also fetch PE/PEG for every ticker
    pub fn with_fundamentals(mut self, source: Arc<dyn FundamentalsSource>) -> Self {
        self.fundamentals = Some(source);
        self
    }

    /// Fetch inputs for every ticker, skipping those that came back empty
    pub async fn collect(&self, universe: &[String], history_days: u32) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(universe.len());

        for ticker in universe {
            self.throttle.until_ready().await;
            let series = match self.history.price_history(ticker, history_days).await {
                Fetched::Data(series) if !series.is_empty() => series,
                Fetched::Data(_) | Fetched::Empty(_) => {
                    tracing::info!(%ticker, "no price history, skipping");
                    continue;
                }
            };

            let fundamentals = match &self.fundamentals {
                Some(source) => source.fundamentals(ticker).await.data(),
                None => None,
            };

            candidates.push(Candidate {
                ticker: ticker.clone(),
                series,
                fundamentals,
            });
        }

        candidates
    }

    /// Fetch, score and rank the universe
    pub async fn run(&self, universe: &[String], criteria: &ScreenerCriteria) -> Vec<ScreenerRow> {
        tracing::info!(tickers = universe.len(), "running screener");
        let candidates = self.collect(universe, criteria.history_days).await;
        let scored = score_all(&candidates, criteria);
        let scored_count = scored.len();
        let rows = rank(scored, criteria);
        tracing::info!(
            fetched = candidates.len(),
            scored = scored_count,
            returned = rows.len(),
            "screener finished"
        );
        rows
    }
}
