//! Flat-file result store: one directory per date under a root path.
//!
//! ```text
//! root/
//!   symbols.txt            latest tradable universe, comma-separated
//!   2024-06-01/
//!     prices.txt           SYMBOL|close1,close2,...
//!     ranked.json          pretty-printed SymbolStrength array
//!     0.RS_20240601.txt    watchlist artifact
//! ```

use crate::domain::config::StorageConfig;
use crate::domain::error::RsError;
use crate::domain::price_record::PriceRecord;
use crate::domain::symbol_strength::SymbolStrength;
use crate::domain::universe::parse_symbol_list;
use crate::ports::result_store_port::ResultStore;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FlatFileStore {
    root: PathBuf,
    symbol_list_file: String,
    price_file: String,
    ranked_file: String,
}

fn storage_error(path: &Path, e: impl std::fmt::Display) -> RsError {
    RsError::Storage {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// `Ok(None)` for a missing file, otherwise the content or a storage error.
fn read_optional(path: &Path) -> Result<Option<String>, RsError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(storage_error(path, e)),
    }
}

impl FlatFileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.result_path.clone(),
            symbol_list_file: config.symbol_list_file.clone(),
            price_file: config.price_file.clone(),
            ranked_file: config.ranked_file.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format("%Y-%m-%d").to_string())
    }

    fn write_file(&self, dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf, RsError> {
        fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
        let path = dir.join(file_name);
        fs::write(&path, content).map_err(|e| storage_error(&path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "file written");
        Ok(path)
    }
}

impl ResultStore for FlatFileStore {
    fn write_price_batch(&self, date: NaiveDate, records: &[PriceRecord]) -> Result<PathBuf, RsError> {
        let dir = self.partition_path(date);
        let target = dir.join(&self.price_file);
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'|')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .from_writer(Vec::new());

        for record in records {
            wtr.write_record([record.symbol.as_str(), record.joined_closes().as_str()])
                .map_err(|e| storage_error(&target, e))?;
        }
        let buf = wtr.into_inner().map_err(|e| storage_error(&target, e))?;
        self.write_file(&dir, &self.price_file, &buf)
    }

    fn read_price_batch(&self, date: NaiveDate) -> Result<Vec<PriceRecord>, RsError> {
        let path = self.partition_path(date).join(&self.price_file);
        let Some(content) = read_optional(&path)? else {
            return Ok(Vec::new());
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| RsError::CorruptHistory {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            if row.len() != 2 {
                debug!(path = %path.display(), fields = row.len(), "malformed price line skipped");
                continue;
            }
            records.push(PriceRecord::new(&row[0], PriceRecord::parse_closes(&row[1])));
        }
        Ok(records)
    }

    fn write_ranked(&self, date: NaiveDate, ranked: &[SymbolStrength]) -> Result<PathBuf, RsError> {
        let dir = self.partition_path(date);
        let json = serde_json::to_string_pretty(ranked)
            .map_err(|e| storage_error(&dir.join(&self.ranked_file), e))?;
        self.write_file(&dir, &self.ranked_file, json.as_bytes())
    }

    fn read_ranked(&self, date: NaiveDate) -> Result<Option<Vec<SymbolStrength>>, RsError> {
        let path = self.partition_path(date).join(&self.ranked_file);
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };
        if content.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RsError::CorruptHistory {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn read_universe(&self) -> Result<Option<Vec<String>>, RsError> {
        let path = self.root.join(&self.symbol_list_file);
        Ok(read_optional(&path)?.map(|content| parse_symbol_list(&content)))
    }

    fn write_universe(&self, symbols: &[String]) -> Result<(), RsError> {
        self.write_file(&self.root, &self.symbol_list_file, symbols.join(",").as_bytes())?;
        Ok(())
    }

    fn write_artifact(&self, date: NaiveDate, file_name: &str, content: &str) -> Result<PathBuf, RsError> {
        self.write_file(&self.partition_path(date), file_name, content.as_bytes())
    }

    fn list_partitions(&self) -> Result<Vec<String>, RsError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error(&self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage_error(&self.root, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| storage_error(&entry.path(), e))?
                .is_dir();
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn remove_partition(&self, name: &str) -> Result<(), RsError> {
        let path = self.root.join(name);
        fs::remove_dir_all(&path).map_err(|e| storage_error(&path, e))?;
        debug!(path = %path.display(), "partition removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, FlatFileStore) {
        let dir = TempDir::new().unwrap();
        let store = FlatFileStore::new(&StorageConfig {
            result_path: dir.path().join("results"),
            symbol_list_file: "symbols.txt".into(),
            price_file: "prices.txt".into(),
            ranked_file: "ranked.json".into(),
            retention_days: 30,
        });
        (dir, store)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn price_batch_written_in_pipe_format() {
        let (_dir, store) = setup_store();
        let records = vec![
            PriceRecord::new("BTCUSDT", vec![100.0, 101.5]),
            PriceRecord::new("ETHUSDT", vec![3000.25]),
        ];
        let path = store.write_price_batch(date(1), &records).unwrap();

        assert_eq!(path, store.root().join("2024-06-01").join("prices.txt"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "BTCUSDT|100,101.5\nETHUSDT|3000.25\n"
        );
        assert_eq!(store.read_price_batch(date(1)).unwrap(), records);
    }

    #[test]
    fn price_batch_reader_skips_malformed_lines() {
        let (_dir, store) = setup_store();
        let partition = store.partition_path(date(2));
        fs::create_dir_all(&partition).unwrap();
        fs::write(
            partition.join("prices.txt"),
            "BTCUSDT|1,2,3\nnot a record\nA|B|C\n\nETHUSDT | 4,x,6\r\n",
        )
        .unwrap();

        let records = store.read_price_batch(date(2)).unwrap();
        assert_eq!(
            records,
            vec![
                PriceRecord::new("BTCUSDT", vec![1.0, 2.0, 3.0]),
                PriceRecord::new("ETHUSDT", vec![4.0, 0.0, 6.0]),
            ]
        );
    }

    #[test]
    fn missing_price_batch_is_empty() {
        let (_dir, store) = setup_store();
        assert!(store.read_price_batch(date(3)).unwrap().is_empty());
    }

    #[test]
    fn ranked_round_trip_uses_pascal_case() {
        let (_dir, store) = setup_store();
        let mut entry = SymbolStrength::unranked("BTCUSDT", 101.0, 0.5, 0.4, 0.3);
        entry.strength = 0.75;
        let path = store.write_ranked(date(1), &[entry.clone()]).unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"Symbol\": \"BTCUSDT\""));
        assert!(raw.contains("\"Strength\": 0.75"));
        assert_eq!(store.read_ranked(date(1)).unwrap(), Some(vec![entry]));
    }

    #[test]
    fn missing_ranked_is_none() {
        let (_dir, store) = setup_store();
        assert_eq!(store.read_ranked(date(1)).unwrap(), None);
    }

    #[test]
    fn corrupt_ranked_is_reported() {
        let (_dir, store) = setup_store();
        store.write_artifact(date(1), "ranked.json", "{not json").unwrap();
        let err = store.read_ranked(date(1)).unwrap_err();
        assert!(matches!(err, RsError::CorruptHistory { .. }));
    }

    #[test]
    fn universe_snapshot_lives_at_root() {
        let (_dir, store) = setup_store();
        assert_eq!(store.read_universe().unwrap(), None);

        store
            .write_universe(&["BTCUSDT".to_string(), "ETHUSDT".to_string()])
            .unwrap();
        assert_eq!(
            fs::read_to_string(store.root().join("symbols.txt")).unwrap(),
            "BTCUSDT,ETHUSDT"
        );
        assert_eq!(
            store.read_universe().unwrap(),
            Some(vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()])
        );
    }

    #[test]
    fn artifact_overwrites() {
        let (_dir, store) = setup_store();
        store.write_artifact(date(1), "0.RS_20240601.txt", "first").unwrap();
        let path = store.write_artifact(date(1), "0.RS_20240601.txt", "second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn partitions_listed_and_removed() {
        let (_dir, store) = setup_store();
        assert!(store.list_partitions().unwrap().is_empty());

        store.write_artifact(date(2), "a.txt", "x").unwrap();
        store.write_artifact(date(1), "a.txt", "x").unwrap();
        store.write_universe(&["BTCUSDT".to_string()]).unwrap();

        assert_eq!(
            store.list_partitions().unwrap(),
            vec!["2024-06-01".to_string(), "2024-06-02".to_string()]
        );

        store.remove_partition("2024-06-01").unwrap();
        assert_eq!(store.list_partitions().unwrap(), vec!["2024-06-02".to_string()]);
        assert!(store.remove_partition("2024-06-01").is_err());
    }
}
