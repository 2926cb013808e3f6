//! Improvement detection: which not-yet-top symbols gained the most strength
//! since the snapshot persisted `lookback_days` calendar days earlier.

use crate::domain::symbol_strength::SymbolStrength;
use crate::ports::result_store_port::ResultStore;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tracing::{info, warn};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 5;
pub const DEFAULT_TOP_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImprovementParams {
    /// Leading entries of the current ranking to leave out (already prominent).
    pub exclude_top: usize,
    pub lookback_days: u32,
    pub top_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImprovedSymbol {
    pub current: SymbolStrength,
    pub previous_strength: f64,
    pub improvement: f64,
}

/// Rank candidates by strength gained versus `past`.
///
/// Candidates are `current_ranked` with the first `exclude_top` entries
/// skipped. Symbols missing from `past` are dropped. Ties keep candidate
/// order.
pub fn detect_improvement(
    current_ranked: &[SymbolStrength],
    past: &[SymbolStrength],
    exclude_top: usize,
    top_count: usize,
) -> Vec<ImprovedSymbol> {
    // first entry wins on duplicate symbols
    let past_strength: HashMap<&str, f64> = past
        .iter()
        .rev()
        .map(|s| (s.symbol.as_str(), s.strength))
        .collect();

    let mut improved: Vec<ImprovedSymbol> = current_ranked
        .iter()
        .skip(exclude_top)
        .filter_map(|s| {
            past_strength.get(s.symbol.as_str()).map(|&previous| ImprovedSymbol {
                current: s.clone(),
                previous_strength: previous,
                improvement: s.strength - previous,
            })
        })
        .collect();

    improved.sort_by(|a, b| b.improvement.total_cmp(&a.improvement));
    improved.truncate(top_count);
    improved
}

/// Compare against the snapshot from `params.lookback_days` before `as_of`.
///
/// `None` when that snapshot is missing, empty or unreadable: there is
/// nothing to compare against yet, which is not an error.
pub fn find_improvers(
    store: &dyn ResultStore,
    current_ranked: &[SymbolStrength],
    as_of: NaiveDate,
    params: &ImprovementParams,
) -> Option<Vec<ImprovedSymbol>> {
    let Some(past_date) = as_of.checked_sub_days(Days::new(u64::from(params.lookback_days))) else {
        warn!(date = %as_of, days = params.lookback_days, "lookback date out of range");
        return None;
    };

    let past = match store.read_ranked(past_date) {
        Ok(Some(past)) if !past.is_empty() => past,
        Ok(Some(_)) => {
            info!(date = %past_date, "past ranking is empty, improvement unavailable");
            return None;
        }
        Ok(None) => {
            info!(date = %past_date, "no past ranking, improvement unavailable");
            return None;
        }
        Err(e) => {
            warn!(date = %past_date, error = %e, "past ranking unreadable, improvement unavailable");
            return None;
        }
    };

    let improved = detect_improvement(current_ranked, &past, params.exclude_top, params.top_count);
    info!(date = %past_date, count = improved.len(), "improvement computed");
    Some(improved)
}
