//! Configuration validation.
//!
//! Checks every key the daily job reads before any network or disk work.

use crate::domain::error::RsError;
use crate::domain::statistics::TieBreak;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const MAX_TOP_COUNT: i64 = 100;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    validate_ranking_config(config)?;
    validate_storage_config(config)?;
    validate_source_config(config)?;
    validate_telegram_config(config)?;
    validate_logging_config(config)?;
    Ok(())
}

pub fn validate_ranking_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    for key in ["current_term_days", "short_days", "middle_days", "long_days"] {
        validate_positive_int(config, "ranking", key)?;
    }
    for key in [
        "current_term_weight",
        "short_term_weight",
        "middle_term_weight",
        "long_term_weight",
    ] {
        validate_weight(config, key)?;
    }
    validate_top_count(config)?;
    validate_optional_positive_int(config, "ranking", "improvement_lookback_days")?;
    validate_optional_positive_int(config, "ranking", "improvement_top_count")?;
    validate_tie_break(config)?;
    Ok(())
}

pub fn validate_storage_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    for key in ["result_path", "symbol_list_file", "price_file", "ranked_file"] {
        validate_required_string(config, "storage", key)?;
    }
    for key in ["symbol_list_file", "price_file", "ranked_file"] {
        validate_file_name(config, key)?;
    }
    validate_optional_positive_int(config, "storage", "retention_days")?;
    Ok(())
}

pub fn validate_source_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    let kind = config
        .get_string("source", "kind")
        .unwrap_or_else(|| "binance".to_string());
    match kind.trim().to_ascii_lowercase().as_str() {
        "binance" => Ok(()),
        "file" => validate_replay_date(config),
        other => Err(RsError::invalid(
            "source",
            "kind",
            format!("unknown source kind '{other}', expected binance or file"),
        )),
    }
}

pub fn validate_telegram_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    if !config.get_bool("telegram", "enabled", false) {
        return Ok(());
    }
    for key in ["bot_token", "rank_chat_id", "universe_chat_id"] {
        validate_required_string(config, "telegram", key)?;
    }
    Ok(())
}

pub fn validate_logging_config(config: &dyn ConfigPort) -> Result<(), RsError> {
    if let Some(level) = config.get_string("logging", "level") {
        validate_log_level(level.trim())?;
    }
    match config.get_string("logging", "format").as_deref().map(str::trim) {
        None | Some("pretty") | Some("json") => Ok(()),
        Some(other) => Err(RsError::invalid(
            "logging",
            "format",
            format!("unknown log format '{other}', expected pretty or json"),
        )),
    }
}

/// A bare level (`info`) or a full filter directive list (`info,rsdaily=debug`).
fn validate_log_level(level: &str) -> Result<(), RsError> {
    let valid = if level.is_empty() {
        true
    } else if level.contains(['=', ',']) {
        EnvFilter::try_new(level).is_ok()
    } else {
        level.parse::<LevelFilter>().is_ok()
    };
    if valid {
        Ok(())
    } else {
        Err(RsError::invalid(
            "logging",
            "level",
            format!("invalid log level '{level}', expected trace, debug, info, warn, error or a filter directive"),
        ))
    }
}

fn validate_required_string(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), RsError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(RsError::missing(section, key)),
    }
}

fn parse_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<i64>, RsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| RsError::invalid(section, key, format!("{key} must be an integer"))),
    }
}

fn validate_positive_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), RsError> {
    match parse_int(config, section, key)? {
        None => Err(RsError::missing(section, key)),
        Some(v) if v < 1 => Err(RsError::invalid(section, key, format!("{key} must be positive"))),
        Some(_) => Ok(()),
    }
}

fn validate_optional_positive_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), RsError> {
    match parse_int(config, section, key)? {
        Some(v) if v < 1 => Err(RsError::invalid(section, key, format!("{key} must be positive"))),
        _ => Ok(()),
    }
}

fn validate_weight(config: &dyn ConfigPort, key: &str) -> Result<(), RsError> {
    let Some(raw) = config.get_string("ranking", key) else {
        return Err(RsError::missing("ranking", key));
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| RsError::invalid("ranking", key, format!("{key} must be a number")))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(RsError::invalid(
            "ranking",
            key,
            format!("{key} must be between 0 and 1"),
        ));
    }
    Ok(())
}

fn validate_top_count(config: &dyn ConfigPort) -> Result<(), RsError> {
    match parse_int(config, "ranking", "top_count")? {
        None => Err(RsError::missing("ranking", "top_count")),
        Some(v) if !(1..=MAX_TOP_COUNT).contains(&v) => Err(RsError::invalid(
            "ranking",
            "top_count",
            format!("top_count must be between 1 and {MAX_TOP_COUNT}"),
        )),
        Some(_) => Ok(()),
    }
}

fn validate_tie_break(config: &dyn ConfigPort) -> Result<(), RsError> {
    match config.get_string("ranking", "tie_break") {
        None => Ok(()),
        Some(s) if TieBreak::parse(&s).is_some() => Ok(()),
        Some(s) => Err(RsError::invalid(
            "ranking",
            "tie_break",
            format!("unknown tie_break '{}', expected first or average", s.trim()),
        )),
    }
}

fn validate_file_name(config: &dyn ConfigPort, key: &str) -> Result<(), RsError> {
    let name = config.get_string("storage", key).unwrap_or_default();
    if name.contains('/') || name.contains('\\') {
        return Err(RsError::invalid(
            "storage",
            key,
            format!("{key} must be a bare file name"),
        ));
    }
    Ok(())
}

fn validate_replay_date(config: &dyn ConfigPort) -> Result<(), RsError> {
    match config.get_string("source", "replay_date") {
        None => Err(RsError::missing("source", "replay_date")),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| {
                RsError::invalid(
                    "source",
                    "replay_date",
                    "invalid replay_date format, expected YYYY-MM-DD",
                )
            }),
    }
}
