//! Price source port trait.

use crate::domain::error::RsError;

/// Candle interval unit; combined with a count, e.g. `1` + `Day` = `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Second,
    Minute,
    Hour,
    Day,
}

impl Interval {
    pub fn code(self) -> char {
        match self {
            Interval::Second => 's',
            Interval::Minute => 'm',
            Interval::Hour => 'h',
            Interval::Day => 'd',
        }
    }
}

/// Whether prices come from a live venue or from a persisted replay.
///
/// Replays skip universe diffing and retention: they describe a past day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Live,
    Replay,
}

pub trait PriceSource {
    fn kind(&self) -> SourceKind;

    fn list_tradable_symbols(&self) -> Result<Vec<String>, RsError>;

    /// At most `limit` most-recent closes, oldest first. Unknown symbols
    /// yield an empty series rather than an error.
    fn fetch_closes(
        &self,
        symbol: &str,
        interval_count: u32,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, RsError>;

    /// Comma-joined symbols in TradingView watchlist form.
    fn watchlist_symbols(&self, symbols: &[String]) -> String {
        symbols
            .iter()
            .map(|s| format!("BINANCE:{s}.P"))
            .collect::<Vec<_>>()
            .join(",")
    }
}
