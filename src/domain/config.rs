//! Typed application configuration, built once from a [`ConfigPort`].

use crate::domain::config_validation::validate_config;
use crate::domain::error::RsError;
use crate::domain::improvement::{ImprovementParams, DEFAULT_LOOKBACK_DAYS, DEFAULT_TOP_COUNT};
use crate::domain::ranking::{Lookbacks, RankingParams, Weights};
use crate::domain::retention::DEFAULT_RETENTION_DAYS;
use crate::domain::statistics::TieBreak;
use crate::domain::universe::IgnoreList;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_BINANCE_URL: &str = "https://fapi.binance.com";

const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ranking: RankingConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
    /// `None` when `[telegram] enabled` is false or absent.
    pub telegram: Option<TelegramConfig>,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate every key, then read them into typed values.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, RsError> {
        validate_config(config)?;
        Ok(Self {
            ranking: RankingConfig::from_port(config)?,
            storage: StorageConfig::from_port(config),
            source: SourceConfig::from_port(config)?,
            telegram: TelegramConfig::from_port(config),
            logging: LoggingConfig::from_port(config),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub params: RankingParams,
    pub top_count: usize,
    pub ignore: IgnoreList,
    pub improvement: ImprovementParams,
}

fn read_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

impl RankingConfig {
    fn from_port(config: &dyn ConfigPort) -> Result<Self, RsError> {
        let lookbacks = Lookbacks {
            current: read_usize(config, "ranking", "current_term_days", 0),
            short: read_usize(config, "ranking", "short_days", 0),
            middle: read_usize(config, "ranking", "middle_days", 0),
            long: read_usize(config, "ranking", "long_days", 0),
        };
        let weights = Weights {
            current: config.get_double("ranking", "current_term_weight", 0.0),
            short: config.get_double("ranking", "short_term_weight", 0.0),
            middle: config.get_double("ranking", "middle_term_weight", 0.0),
            long: config.get_double("ranking", "long_term_weight", 0.0),
        };
        let tie_break = config
            .get_string("ranking", "tie_break")
            .and_then(|s| TieBreak::parse(&s))
            .unwrap_or_default();
        let top_count = read_usize(config, "ranking", "top_count", 0);

        Ok(Self {
            params: RankingParams::new(lookbacks, weights, tie_break)?,
            top_count,
            ignore: IgnoreList::parse(&config.get_string("ranking", "ignore_symbols").unwrap_or_default()),
            improvement: ImprovementParams {
                exclude_top: top_count,
                lookback_days: u32::try_from(config.get_int(
                    "ranking",
                    "improvement_lookback_days",
                    i64::from(DEFAULT_LOOKBACK_DAYS),
                ))
                .unwrap_or(DEFAULT_LOOKBACK_DAYS),
                top_count: read_usize(config, "ranking", "improvement_top_count", DEFAULT_TOP_COUNT),
            },
        })
    }

    /// Whether the four weights sum to 1 within tolerance. Unbalanced
    /// weights are allowed but worth a warning.
    pub fn weights_balanced(&self) -> bool {
        (self.params.weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub result_path: PathBuf,
    pub symbol_list_file: String,
    pub price_file: String,
    pub ranked_file: String,
    pub retention_days: u32,
}

impl StorageConfig {
    fn from_port(config: &dyn ConfigPort) -> Self {
        let get = |key: &str| {
            config
                .get_string("storage", key)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            result_path: PathBuf::from(get("result_path")),
            symbol_list_file: get("symbol_list_file"),
            price_file: get("price_file"),
            ranked_file: get("ranked_file"),
            retention_days: u32::try_from(config.get_int(
                "storage",
                "retention_days",
                i64::from(DEFAULT_RETENTION_DAYS),
            ))
            .unwrap_or(DEFAULT_RETENTION_DAYS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Binance { base_url: String },
    /// Re-rank the price batch persisted on `date`.
    Replay { date: NaiveDate },
}

impl SourceConfig {
    fn from_port(config: &dyn ConfigPort) -> Result<Self, RsError> {
        let kind = config
            .get_string("source", "kind")
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "binance".to_string());
        if kind == "file" {
            let raw = config
                .get_string("source", "replay_date")
                .ok_or_else(|| RsError::missing("source", "replay_date"))?;
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| RsError::invalid("source", "replay_date", e.to_string()))?;
            return Ok(SourceConfig::Replay { date });
        }
        let base_url = config
            .get_string("source", "base_url")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BINANCE_URL.to_string());
        Ok(SourceConfig::Binance { base_url })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub rank_chat_id: String,
    pub universe_chat_id: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("rank_chat_id", &self.rank_chat_id)
            .field("universe_chat_id", &self.universe_chat_id)
            .finish()
    }
}

impl TelegramConfig {
    fn from_port(config: &dyn ConfigPort) -> Option<Self> {
        if !config.get_bool("telegram", "enabled", false) {
            return None;
        }
        let get = |key: &str| {
            config
                .get_string("telegram", key)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        Some(Self {
            bot_token: get("bot_token"),
            rank_chat_id: get("rank_chat_id"),
            universe_chat_id: get("universe_chat_id"),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    fn from_port(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        Self {
            level: config
                .get_string("logging", "level")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.level),
            format: match config.get_string("logging", "format").as_deref().map(str::trim) {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Install the global subscriber. `RUST_LOG` overrides the configured
    /// level. A second call is a no-op.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let _ = match self.format {
            LogFormat::Json => fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Pretty => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    }
}
