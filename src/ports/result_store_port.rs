//! Result store port trait.
//!
//! History is partitioned by calendar date. The tradable-symbol snapshot is
//! the one unpartitioned artifact: it always holds the latest list.

use crate::domain::error::RsError;
use crate::domain::price_record::PriceRecord;
use crate::domain::symbol_strength::SymbolStrength;
use chrono::NaiveDate;
use std::path::PathBuf;

pub trait ResultStore {
    fn write_price_batch(&self, date: NaiveDate, records: &[PriceRecord]) -> Result<PathBuf, RsError>;

    /// Empty when the partition or file does not exist.
    fn read_price_batch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, RsError>;

    fn write_ranked(&self, date: NaiveDate, ranked: &[SymbolStrength]) -> Result<PathBuf, RsError>;

    /// `Ok(None)` when absent, `Err(CorruptHistory)` when present but unreadable.
    fn read_ranked(&self, date: NaiveDate) -> Result<Option<Vec<SymbolStrength>>, RsError>;

    fn read_universe(&self) -> Result<Option<Vec<String>>, RsError>;

    fn write_universe(&self, symbols: &[String]) -> Result<(), RsError>;

    fn write_artifact(&self, date: NaiveDate, file_name: &str, content: &str) -> Result<PathBuf, RsError>;

    /// Names of every partition directory, dated or not.
    fn list_partitions(&self) -> Result<Vec<String>, RsError>;

    fn remove_partition(&self, name: &str) -> Result<(), RsError>;
}
