#![allow(dead_code)]

use chrono::NaiveDate;
use rsdaily::adapters::file_config_adapter::FileConfigAdapter;
use rsdaily::adapters::flat_file_store::FlatFileStore;
use rsdaily::domain::config::AppConfig;
use rsdaily::domain::error::RsError;
use rsdaily::ports::notification_port::{NotificationPort, RankingNotice};
use rsdaily::ports::price_port::{Interval, PriceSource, SourceKind};
use std::cell::RefCell;
use std::path::Path;

pub struct MockPriceSource {
    pub kind: SourceKind,
    pub series: Vec<(String, Vec<f64>)>,
    pub errors: Vec<(String, String)>,
    pub requests: RefCell<Vec<(String, usize)>>,
}

impl MockPriceSource {
    pub fn live() -> Self {
        Self {
            kind: SourceKind::Live,
            series: Vec::new(),
            errors: Vec::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn replay() -> Self {
        Self {
            kind: SourceKind::Replay,
            ..Self::live()
        }
    }

    pub fn with_series(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.series.push((symbol.to_string(), closes));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.series.push((symbol.to_string(), Vec::new()));
        self.errors.push((symbol.to_string(), reason.to_string()));
        self
    }

    pub fn requested(&self, symbol: &str) -> bool {
        self.requests.borrow().iter().any(|(s, _)| s == symbol)
    }
}

impl PriceSource for MockPriceSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn list_tradable_symbols(&self) -> Result<Vec<String>, RsError> {
        Ok(self.series.iter().map(|(s, _)| s.clone()).collect())
    }

    fn fetch_closes(
        &self,
        symbol: &str,
        _interval_count: u32,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<f64>, RsError> {
        self.requests.borrow_mut().push((symbol.to_string(), limit));
        if let Some((_, reason)) = self.errors.iter().find(|(s, _)| s == symbol) {
            return Err(RsError::PriceSource {
                target: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let closes = self
            .series
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| c.as_slice())
            .unwrap_or_default();
        Ok(closes[closes.len().saturating_sub(limit)..].to_vec())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub rankings: RefCell<Vec<RankingNotice>>,
    pub universe_messages: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl NotificationPort for RecordingNotifier {
    fn send_ranking(&self, notice: &RankingNotice) -> Result<(), RsError> {
        self.rankings.borrow_mut().push(notice.clone());
        if self.fail {
            return Err(RsError::Notification {
                reason: "chat unavailable".into(),
            });
        }
        Ok(())
    }

    fn send_universe_change(&self, message: &str) -> Result<(), RsError> {
        self.universe_messages.borrow_mut().push(message.to_string());
        if self.fail {
            return Err(RsError::Notification {
                reason: "chat unavailable".into(),
            });
        }
        Ok(())
    }
}

pub fn config_ini(root: &Path, top_count: usize, extra_ranking: &str) -> String {
    format!(
        "[ranking]\n\
         current_term_days = 3\n\
         short_days = 3\n\
         middle_days = 5\n\
         long_days = 10\n\
         current_term_weight = 0.25\n\
         short_term_weight = 0.25\n\
         middle_term_weight = 0.25\n\
         long_term_weight = 0.25\n\
         top_count = {top_count}\n\
         {extra_ranking}\n\
         [storage]\n\
         result_path = {}\n\
         symbol_list_file = symbols.txt\n\
         price_file = prices.txt\n\
         ranked_file = ranked.json\n\
         retention_days = 30\n",
        root.display()
    )
}

pub fn sample_config(root: &Path, top_count: usize) -> AppConfig {
    config_with(root, top_count, "")
}

pub fn config_with(root: &Path, top_count: usize, extra_ranking: &str) -> AppConfig {
    let adapter = FileConfigAdapter::from_string(&config_ini(root, top_count, extra_ranking)).unwrap();
    AppConfig::from_port(&adapter).unwrap()
}

pub fn store_for(config: &AppConfig) -> FlatFileStore {
    FlatFileStore::new(&config.storage)
}

pub fn rising(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Four symbols with clearly separated momentum: AAA > BBB > CCC > DDD.
pub fn four_symbol_source(kind: SourceKind) -> MockPriceSource {
    let base = match kind {
        SourceKind::Live => MockPriceSource::live(),
        SourceKind::Replay => MockPriceSource::replay(),
    };
    base.with_series("AAAUSDT", rising(12, 100.0, 8.0))
        .with_series("BBBUSDT", rising(12, 100.0, 4.0))
        .with_series("CCCUSDT", rising(12, 100.0, 1.0))
        .with_series("DDDUSDT", rising(12, 100.0, -2.0))
}
