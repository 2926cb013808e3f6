//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading from INI files on disk (load_config)
//! - Argument parsing for the run and validate commands
//! - A full `run` against a replay source in a temp directory

mod common;

use clap::Parser;
use common::*;
use rsdaily::cli::{self, Cli, Command};
use rsdaily::domain::config::SourceConfig;
use rsdaily::domain::error::RsError;
use rsdaily::domain::price_record::PriceRecord;
use rsdaily::domain::statistics::TieBreak;
use rsdaily::ports::result_store_port::ResultStore;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[ranking]
current_term_days = 7
short_days = 5
middle_days = 7
long_days = 10
current_term_weight = 0.4
short_term_weight = 0.2
middle_term_weight = 0.2
long_term_weight = 0.2
top_count = 30
ignore_symbols = USDCUSDT,BTCDOMUSDT
tie_break = average

[storage]
result_path = /var/lib/rsdaily
symbol_list_file = symbols.txt
price_file = prices.txt
ranked_file = ranked.json
retention_days = 14

[source]
kind = binance

[telegram]
enabled = true
bot_token = 123456:ABC
rank_chat_id = -1001
universe_chat_id = -1002

[logging]
level = debug
format = json
"#;

mod config_loading {
    use super::*;

    #[test]
    fn load_config_valid_full() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(&file.path().to_path_buf()).unwrap();

        assert_eq!(config.ranking.params.lookbacks.long, 10);
        assert!((config.ranking.params.weights.current - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.ranking.params.tie_break, TieBreak::Average);
        assert_eq!(config.ranking.top_count, 30);
        assert_eq!(config.ranking.ignore.len(), 2);
        assert_eq!(config.ranking.improvement.exclude_top, 30);
        assert_eq!(config.storage.result_path, PathBuf::from("/var/lib/rsdaily"));
        assert_eq!(config.storage.retention_days, 14);
        assert!(matches!(config.source, SourceConfig::Binance { .. }));
        assert_eq!(config.telegram.unwrap().universe_chat_id, "-1002");
    }

    #[test]
    fn load_config_missing_file() {
        let err = cli::load_config(&PathBuf::from("/nonexistent/rsdaily.ini")).unwrap_err();
        assert!(matches!(err, RsError::ConfigParse { .. }));
    }

    #[test]
    fn load_config_invalid_top_count() {
        let file = write_temp_ini(&VALID_INI.replace("top_count = 30", "top_count = 500"));
        let err = cli::load_config(&file.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, RsError::ConfigInvalid { key, .. } if key == "top_count"));
    }

    #[test]
    fn load_config_missing_storage_key() {
        let file = write_temp_ini(&VALID_INI.replace("ranked_file = ranked.json\n", ""));
        let err = cli::load_config(&file.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, RsError::ConfigMissing { key, .. } if key == "ranked_file"));
    }

    #[test]
    fn load_config_telegram_without_token() {
        let file = write_temp_ini(&VALID_INI.replace("bot_token = 123456:ABC\n", ""));
        let err = cli::load_config(&file.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, RsError::ConfigMissing { section, key } if section == "telegram" && key == "bot_token"));
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn run_with_date_and_dry_run() {
        let cli = Cli::try_parse_from([
            "rsdaily", "run", "--config", "rs.ini", "--date", "2024-06-01", "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                config,
                date: parsed,
                dry_run,
            } => {
                assert_eq!(config, PathBuf::from("rs.ini"));
                assert_eq!(parsed, Some(date("2024-06-01")));
                assert!(dry_run);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn run_defaults() {
        let cli = Cli::try_parse_from(["rsdaily", "run", "-c", "rs.ini"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Run {
                date: None,
                dry_run: false,
                ..
            }
        ));
    }

    #[test]
    fn run_rejects_bad_date() {
        assert!(Cli::try_parse_from(["rsdaily", "run", "-c", "rs.ini", "--date", "06/01/2024"]).is_err());
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["rsdaily", "validate"]).is_err());
        assert!(Cli::try_parse_from(["rsdaily", "validate", "--config", "rs.ini"]).is_ok());
    }
}

mod replay_run {
    use super::*;

    #[test]
    fn run_command_ranks_replayed_batch() {
        let dir = TempDir::new().unwrap();
        let ini = format!(
            "{}[source]\nkind = file\nreplay_date = 2024-06-01\n[telegram]\nenabled = false\n",
            config_ini(dir.path(), 2, "")
        );
        let file = write_temp_ini(&ini);

        let config = cli::load_config(&file.path().to_path_buf()).unwrap();
        let store = store_for(&config);
        store
            .write_price_batch(
                date("2024-06-01"),
                &[
                    PriceRecord::new("AAAUSDT", rising(10, 100.0, 5.0)),
                    PriceRecord::new("BBBUSDT", rising(10, 100.0, 1.0)),
                    PriceRecord::new("CCCUSDT", vec![1.0, 2.0]),
                ],
            )
            .unwrap();

        let cli = Cli::try_parse_from([
            "rsdaily",
            "run",
            "--config",
            file.path().to_str().unwrap(),
            "--date",
            "2024-06-02",
        ])
        .unwrap();
        let _ = cli::run(cli);

        let ranked = store.read_ranked(date("2024-06-02")).unwrap().unwrap();
        let names: Vec<&str> = ranked.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["AAAUSDT", "BBBUSDT"]);
        assert!(dir.path().join("2024-06-02/0.RS_20240602.txt").exists());
        assert_eq!(store.read_universe().unwrap(), None);
    }

    #[test]
    fn validate_command_leaves_no_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("results");
        let file = write_temp_ini(&config_ini(&root, 5, ""));

        let cli = Cli::try_parse_from(["rsdaily", "validate", "-c", file.path().to_str().unwrap()]).unwrap();
        let _ = cli::run(cli);

        assert!(!root.exists());
    }
}
