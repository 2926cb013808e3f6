//! Replays a persisted price batch as a price source.

use crate::domain::error::RsError;
use crate::domain::price_record::PriceRecord;
use crate::ports::price_port::{Interval, PriceSource, SourceKind};
use crate::ports::result_store_port::ResultStore;
use chrono::NaiveDate;
use tracing::info;

pub struct ReplayAdapter {
    records: Vec<PriceRecord>,
}

impl ReplayAdapter {
    /// Load the batch stored under `date`. A missing partition replays as an
    /// empty universe.
    pub fn load(store: &dyn ResultStore, date: NaiveDate) -> Result<Self, RsError> {
        let records = store.read_price_batch(date)?;
        info!(date = %date, symbols = records.len(), "replay batch loaded");
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }
}

impl PriceSource for ReplayAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Replay
    }

    fn list_tradable_symbols(&self) -> Result<Vec<String>, RsError> {
        Ok(self.records.iter().map(|r| r.symbol.clone()).collect())
    }

    /// Interval is fixed by whatever the batch recorded; only `limit` applies.
    fn fetch_closes(
        &self,
        symbol: &str,
        _interval_count: u32,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, RsError> {
        let closes = self
            .records
            .iter()
            .find(|r| r.symbol == symbol)
            .map(|r| r.closes.as_slice())
            .unwrap_or_default();
        Ok(closes[closes.len().saturating_sub(limit)..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> ReplayAdapter {
        ReplayAdapter::from_records(vec![
            PriceRecord::new("BTCUSDT", vec![1.0, 2.0, 3.0, 4.0]),
            PriceRecord::new("ETHUSDT", vec![5.0]),
        ])
    }

    #[test]
    fn lists_symbols_in_batch_order() {
        assert_eq!(
            adapter().list_tradable_symbols().unwrap(),
            vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]
        );
    }

    #[test]
    fn returns_most_recent_closes() {
        let source = adapter();
        assert_eq!(
            source.fetch_closes("BTCUSDT", 1, Interval::Day, 2).unwrap(),
            vec![3.0, 4.0]
        );
        assert_eq!(
            source.fetch_closes("ETHUSDT", 1, Interval::Day, 10).unwrap(),
            vec![5.0]
        );
    }

    #[test]
    fn unknown_symbol_is_empty() {
        assert!(adapter()
            .fetch_closes("XRPUSDT", 1, Interval::Day, 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn kind_is_replay() {
        assert_eq!(adapter().kind(), SourceKind::Replay);
    }
}
