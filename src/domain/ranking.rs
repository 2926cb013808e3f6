//! Relative-strength ranking run.
//!
//! Each symbol gets four raw metrics from its trailing closes:
//!
//! - `current_term_rs = 100 * last / SMA(current)`
//! - `{short,middle,long}_rs = 100 * slope(trailing N) / SMA(N)`
//!
//! The metrics are then ranked cross-sectionally (percentile rank per metric
//! over the surviving symbols) and combined into a weighted `strength`.
//! Ranking needs the whole population, so it only starts after every symbol
//! has been fetched.

use crate::domain::error::RsError;
use crate::domain::price_record::PriceRecord;
use crate::domain::statistics::{
    percentile_rank_with, regression_slope, simple_moving_average, trailing, TieBreak,
};
use crate::domain::symbol_strength::SymbolStrength;
use crate::domain::universe::IgnoreList;
use crate::ports::price_port::{Interval, PriceSource};
use crate::ports::result_store_port::ResultStore;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Lookback windows in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookbacks {
    pub current: usize,
    pub short: usize,
    pub middle: usize,
    pub long: usize,
}

impl Lookbacks {
    /// Length of price history a symbol needs to be ranked.
    pub fn max(&self) -> usize {
        self.current.max(self.short).max(self.middle).max(self.long)
    }
}

/// Composite weights per horizon. Expected to sum to 1, not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub current: f64,
    pub short: f64,
    pub middle: f64,
    pub long: f64,
}

impl Weights {
    pub fn equal() -> Self {
        Self {
            current: 0.25,
            short: 0.25,
            middle: 0.25,
            long: 0.25,
        }
    }

    pub fn sum(&self) -> f64 {
        self.current + self.short + self.middle + self.long
    }

    pub fn composite(&self, s: &SymbolStrength) -> f64 {
        s.current_term_rs_rank * self.current
            + s.short_rs_rank * self.short
            + s.middle_rs_rank * self.middle
            + s.long_rs_rank * self.long
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingParams {
    pub lookbacks: Lookbacks,
    pub weights: Weights,
    pub tie_break: TieBreak,
}

impl RankingParams {
    /// Rejects non-positive lookbacks and non-finite weights.
    pub fn new(lookbacks: Lookbacks, weights: Weights, tie_break: TieBreak) -> Result<Self, RsError> {
        for (key, days) in [
            ("current_term_days", lookbacks.current),
            ("short_days", lookbacks.short),
            ("middle_days", lookbacks.middle),
            ("long_days", lookbacks.long),
        ] {
            if days == 0 {
                return Err(RsError::invalid("ranking", key, "lookback must be positive"));
            }
        }
        for (key, weight) in [
            ("current_term_weight", weights.current),
            ("short_term_weight", weights.short),
            ("middle_term_weight", weights.middle),
            ("long_term_weight", weights.long),
        ] {
            if !weight.is_finite() {
                return Err(RsError::invalid("ranking", key, "weight must be a finite number"));
            }
        }
        Ok(Self {
            lookbacks,
            weights,
            tie_break,
        })
    }
}

/// Raw RS metrics for one symbol. Always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsMetrics {
    pub current_term_rs: f64,
    pub short_rs: f64,
    pub middle_rs: f64,
    pub long_rs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Ranked(RsMetrics),
    Ignored,
    InsufficientData { have: usize, need: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

/// Everything a ranking run produced: the sorted ranking, the raw price
/// batch to persist, and one outcome per input symbol.
#[derive(Debug, Clone, Default)]
pub struct RankingRun {
    pub ranked: Vec<SymbolStrength>,
    pub price_batch: Vec<PriceRecord>,
    pub outcomes: Vec<SymbolReport>,
}

impl RankingRun {
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, SymbolOutcome::InsufficientData { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, SymbolOutcome::Failed { .. }))
            .count()
    }

    pub fn ignored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == SymbolOutcome::Ignored)
            .count()
    }

    pub fn outcome_of(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| &r.outcome)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn relative_to_average(numerator: f64, average: f64) -> f64 {
    if average != 0.0 {
        finite_or_zero(numerator / average * 100.0)
    } else {
        0.0
    }
}

/// Raw metrics from a close series at least `lookbacks.max()` long.
pub fn compute_metrics(closes: &[f64], lookbacks: &Lookbacks) -> RsMetrics {
    let last = closes.last().copied().unwrap_or(0.0);
    let momentum = |days: usize| {
        relative_to_average(
            regression_slope(trailing(closes, days)),
            simple_moving_average(closes, days),
        )
    };

    RsMetrics {
        current_term_rs: relative_to_average(last, simple_moving_average(closes, lookbacks.current)),
        short_rs: momentum(lookbacks.short),
        middle_rs: momentum(lookbacks.middle),
        long_rs: momentum(lookbacks.long),
    }
}

/// Assign per-metric percentile ranks and the weighted strength in place.
pub fn assign_ranks(strengths: &mut [SymbolStrength], weights: &Weights, tie_break: TieBreak) {
    let column = |f: fn(&SymbolStrength) -> f64| -> Vec<f64> {
        percentile_rank_with(&strengths.iter().map(f).collect::<Vec<_>>(), tie_break)
    };
    let current = column(|s| s.current_term_rs);
    let short = column(|s| s.short_rs);
    let middle = column(|s| s.middle_rs);
    let long = column(|s| s.long_rs);

    for (i, s) in strengths.iter_mut().enumerate() {
        s.current_term_rs_rank = current[i];
        s.short_rs_rank = short[i];
        s.middle_rs_rank = middle[i];
        s.long_rs_rank = long[i];
        s.strength = weights.composite(s);
    }
}

/// Descending by strength. Stable, so ties keep collection order.
pub fn sort_by_strength(strengths: &mut [SymbolStrength]) {
    strengths.sort_by(|a, b| b.strength.total_cmp(&a.strength));
}

/// Fetch, measure and rank every non-ignored symbol. Never fails: per-symbol
/// problems become [`SymbolOutcome`]s.
pub fn rank_symbols(
    symbols: &[String],
    prices: &dyn PriceSource,
    params: &RankingParams,
    ignore: &IgnoreList,
) -> RankingRun {
    let need = params.lookbacks.max();
    let mut run = RankingRun::default();
    let mut strengths = Vec::new();

    for symbol in symbols {
        let outcome = if ignore.contains(symbol) {
            debug!(symbol = %symbol, "ignored");
            SymbolOutcome::Ignored
        } else {
            match prices.fetch_closes(symbol, 1, Interval::Day, need) {
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "price fetch failed, skipping");
                    SymbolOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
                Ok(closes) if closes.len() < need => {
                    info!(symbol = %symbol, have = closes.len(), need, "insufficient history, skipping");
                    SymbolOutcome::InsufficientData {
                        have: closes.len(),
                        need,
                    }
                }
                Ok(closes) => {
                    let metrics = compute_metrics(&closes, &params.lookbacks);
                    strengths.push(SymbolStrength::unranked(
                        symbol,
                        metrics.current_term_rs,
                        metrics.short_rs,
                        metrics.middle_rs,
                        metrics.long_rs,
                    ));
                    run.price_batch.push(PriceRecord::new(symbol, closes));
                    SymbolOutcome::Ranked(metrics)
                }
            }
        };
        run.outcomes.push(SymbolReport {
            symbol: symbol.clone(),
            outcome,
        });
    }

    assign_ranks(&mut strengths, &params.weights, params.tie_break);
    sort_by_strength(&mut strengths);
    run.ranked = strengths;

    info!(
        ranked = run.ranked.len(),
        skipped = run.skipped(),
        failed = run.failed(),
        ignored = run.ignored(),
        "ranking complete"
    );
    run
}

/// Rank and persist under `date`: the raw price batch and the ranked JSON.
/// Nothing is written for an empty run. Write failures are fatal.
///
/// With `keep_batch` set the existing price batch for `date` is left in
/// place, so a replay of that same day keeps its full history.
pub fn run_ranking(
    store: &dyn ResultStore,
    date: NaiveDate,
    symbols: &[String],
    prices: &dyn PriceSource,
    params: &RankingParams,
    ignore: &IgnoreList,
    keep_batch: bool,
) -> Result<RankingRun, RsError> {
    let run = rank_symbols(symbols, prices, params, ignore);

    if keep_batch {
        debug!(date = %date, "replaying this day's batch, leaving it unchanged");
    } else if !run.price_batch.is_empty() {
        let path = store.write_price_batch(date, &run.price_batch)?;
        debug!(path = %path.display(), "price batch written");
    }
    if !run.ranked.is_empty() {
        let path = store.write_ranked(date, &run.ranked)?;
        info!(path = %path.display(), count = run.ranked.len(), "ranked snapshot written");
    }

    Ok(run)
}
