//! Tradable universe: ignore lists and day-over-day change detection.
//!
//! The previous universe is whatever snapshot was persisted last, which is
//! not necessarily calendar-yesterday when runs were skipped.

use crate::domain::error::RsError;
use crate::ports::result_store_port::ResultStore;
use std::collections::HashSet;
use tracing::info;

/// Symbols excluded before any computation or I/O.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreList {
    symbols: HashSet<String>,
}

impl IgnoreList {
    /// Parse a comma-separated list. Blank tokens are dropped.
    pub fn parse(input: &str) -> Self {
        Self {
            symbols: parse_symbol_list(input).into_iter().collect(),
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol.trim())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `symbols` without ignored entries, order preserved.
    pub fn filter(&self, symbols: &[String]) -> Vec<String> {
        symbols
            .iter()
            .filter(|s| !self.contains(s))
            .cloned()
            .collect()
    }
}

/// Split a comma-separated symbol list, trimming whitespace and dropping
/// empty tokens.
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniverseChange {
    /// No usable previous snapshot: the current list becomes the baseline.
    Established { symbols: Vec<String> },
    Changed {
        added: Vec<String>,
        removed: Vec<String>,
        symbols: Vec<String>,
    },
}

impl UniverseChange {
    /// The filtered list to persist as the new snapshot.
    pub fn symbols(&self) -> &[String] {
        match self {
            UniverseChange::Established { symbols } | UniverseChange::Changed { symbols, .. } => symbols,
        }
    }
}

/// Entries of `from` absent from `other`, distinct, in first-seen order.
fn difference(from: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    from.iter()
        .filter(|s| !other.contains(s.as_str()) && seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Compare the current universe against the previous snapshot, both filtered
/// through `ignore`. `None` means nothing changed.
pub fn diff_universe(
    current: &[String],
    previous: Option<&[String]>,
    ignore: &IgnoreList,
) -> Option<UniverseChange> {
    let current = ignore.filter(current);
    let previous = previous.map(|p| ignore.filter(p)).unwrap_or_default();

    if previous.is_empty() {
        return Some(UniverseChange::Established { symbols: current });
    }

    let added = difference(&current, &previous);
    let removed = difference(&previous, &current);
    if added.is_empty() && removed.is_empty() {
        return None;
    }

    Some(UniverseChange::Changed {
        added,
        removed,
        symbols: current,
    })
}

/// Diff against the stored snapshot and persist the new list on change.
pub fn detect_universe_change(
    store: &dyn ResultStore,
    current: &[String],
    ignore: &IgnoreList,
) -> Result<Option<UniverseChange>, RsError> {
    let previous = store.read_universe()?;
    let change = diff_universe(current, previous.as_deref(), ignore);

    match &change {
        None => info!("tradable universe unchanged"),
        Some(UniverseChange::Established { symbols }) => {
            info!(count = symbols.len(), "tradable universe established");
            store.write_universe(symbols)?;
        }
        Some(UniverseChange::Changed {
            added,
            removed,
            symbols,
        }) => {
            info!(added = ?added, removed = ?removed, "tradable universe changed");
            store.write_universe(symbols)?;
        }
    }

    Ok(change)
}
