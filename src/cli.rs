//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::binance_adapter::BinanceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::flat_file_store::FlatFileStore;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::replay_adapter::ReplayAdapter;
use crate::domain::config::{AppConfig, SourceConfig};
use crate::domain::error::RsError;
use crate::domain::improvement::{find_improvers, ImprovedSymbol};
use crate::domain::ranking::run_ranking;
use crate::domain::report::{ranking_caption, universe_message, watchlist_content, watchlist_file_name};
use crate::domain::retention::prune_expired;
use crate::domain::universe::{detect_universe_change, UniverseChange};
use crate::ports::notification_port::{NotificationPort, RankingNotice};
use crate::ports::price_port::{PriceSource, SourceKind};
use crate::ports::result_store_port::ResultStore;

#[derive(Parser, Debug)]
#[command(name = "rsdaily", about = "Daily relative-strength ranking for futures contracts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the universe, persist results and send notifications
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Log notifications instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            date,
            dry_run,
        } => run_daily(&config, date, dry_run),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Load and validate the configuration at `path`.
pub fn load_config(path: &PathBuf) -> Result<AppConfig, RsError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    AppConfig::from_port(&adapter)
}

/// What one daily run did.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub as_of: NaiveDate,
    pub universe_change: Option<UniverseChange>,
    pub ranked: usize,
    pub skipped: usize,
    pub failed: usize,
    pub top: Vec<String>,
    pub improvers: Option<Vec<ImprovedSymbol>>,
    pub watchlist: Option<PathBuf>,
    pub pruned: Vec<String>,
    pub notification_failures: usize,
}

impl DailySummary {
    fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            universe_change: None,
            ranked: 0,
            skipped: 0,
            failed: 0,
            top: Vec::new(),
            improvers: None,
            watchlist: None,
            pruned: Vec::new(),
            notification_failures: 0,
        }
    }
}

/// The daily job against already-built ports.
///
/// Universe diffing and retention only run for live sources. Notification
/// failures are logged and counted; storage failures abort the run.
pub fn run_daily_pipeline(
    prices: &dyn PriceSource,
    store: &dyn ResultStore,
    notifier: &dyn NotificationPort,
    config: &AppConfig,
    as_of: NaiveDate,
) -> Result<DailySummary, RsError> {
    let live = prices.kind() == SourceKind::Live;
    let ranking = &config.ranking;
    let mut summary = DailySummary::new(as_of);

    // Stage 1: Tradable universe
    let symbols = prices.list_tradable_symbols()?;
    info!(date = %as_of, count = symbols.len(), "tradable symbols listed");

    if live {
        if let Some(change) = detect_universe_change(store, &symbols, &ranking.ignore)? {
            if let Err(e) = notifier.send_universe_change(&universe_message(&change)) {
                error!(error = %e, "universe notification failed");
                summary.notification_failures += 1;
            }
            summary.universe_change = Some(change);
        }
    }

    // Stage 2: Rank and persist
    let keep_batch = !live && matches!(config.source, SourceConfig::Replay { date } if date == as_of);
    let run = run_ranking(
        store,
        as_of,
        &symbols,
        prices,
        &ranking.params,
        &ranking.ignore,
        keep_batch,
    )?;
    summary.ranked = run.ranked.len();
    summary.skipped = run.skipped();
    summary.failed = run.failed();

    if run.ranked.is_empty() {
        warn!(date = %as_of, "no symbols ranked, skipping notification");
        return Ok(summary);
    }

    // Stage 3: Improvers against the older snapshot
    let improvers = find_improvers(store, &run.ranked, as_of, &ranking.improvement);

    // Stage 4: Watchlist and ranking notification
    let top = &run.ranked[..ranking.top_count.min(run.ranked.len())];
    let content = watchlist_content(prices, top, improvers.as_deref());
    let path = store.write_artifact(as_of, &watchlist_file_name(as_of), &content)?;
    let notice = RankingNotice {
        caption: ranking_caption(top, improvers.as_deref()),
        attachment: path.clone(),
    };
    if let Err(e) = notifier.send_ranking(&notice) {
        error!(error = %e, "ranking notification failed");
        summary.notification_failures += 1;
    }
    summary.top = top.iter().map(|s| s.symbol.clone()).collect();
    summary.improvers = improvers;
    summary.watchlist = Some(path);

    // Stage 5: Retention
    if live {
        match prune_expired(store, as_of, config.storage.retention_days) {
            Ok(pruned) => summary.pruned = pruned,
            Err(e) => warn!(error = %e, "retention pass failed"),
        }
    }

    Ok(summary)
}

fn build_price_source(config: &AppConfig, store: &FlatFileStore) -> Result<Box<dyn PriceSource>, RsError> {
    match &config.source {
        SourceConfig::Binance { base_url } => Ok(Box::new(BinanceAdapter::new(base_url)?)),
        SourceConfig::Replay { date } => Ok(Box::new(ReplayAdapter::load(store, *date)?)),
    }
}

fn build_notifier(config: &AppConfig, dry_run: bool) -> Result<Box<dyn NotificationPort>, RsError> {
    let Some(telegram) = config.telegram.clone().filter(|_| !dry_run) else {
        return Ok(Box::new(LogNotifier));
    };

    #[cfg(feature = "telegram")]
    {
        use crate::adapters::telegram_adapter::TelegramAdapter;
        Ok(Box::new(TelegramAdapter::new(telegram)?))
    }

    #[cfg(not(feature = "telegram"))]
    {
        let _ = telegram;
        warn!("telegram enabled but the telegram feature is not compiled in, logging only");
        Ok(Box::new(LogNotifier))
    }
}

fn run_daily(config_path: &PathBuf, date: Option<NaiveDate>, dry_run: bool) -> ExitCode {
    // Stage 0: Load config, then logging
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    config.logging.init();
    if !config.ranking.weights_balanced() {
        warn!(
            sum = config.ranking.params.weights.sum(),
            "ranking weights do not sum to 1"
        );
    }

    let as_of = date.unwrap_or_else(|| Local::now().date_naive());
    let store = FlatFileStore::new(&config.storage);

    let prices = match build_price_source(&config, &store) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "price source unavailable");
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let notifier = match build_notifier(&config, dry_run) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    info!(date = %as_of, dry_run, "daily run started");
    let summary = match run_daily_pipeline(prices.as_ref(), &store, notifier.as_ref(), &config, as_of) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "daily run failed");
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== RS Daily {} ===", summary.as_of);
    eprintln!("Ranked:           {}", summary.ranked);
    eprintln!("Skipped:          {}", summary.skipped);
    eprintln!("Failed:           {}", summary.failed);
    if !summary.top.is_empty() {
        eprintln!("Top:              {}", summary.top.join(", "));
    }
    match &summary.improvers {
        Some(improvers) => eprintln!(
            "Improvers:        {}",
            improvers
                .iter()
                .map(|i| i.current.symbol.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        None => eprintln!("Improvers:        unavailable"),
    }
    if let Some(path) = &summary.watchlist {
        eprintln!("Watchlist:        {}", path.display());
    }
    if !summary.pruned.is_empty() {
        eprintln!("Pruned:           {}", summary.pruned.join(", "));
    }
    info!(
        ranked = summary.ranked,
        notification_failures = summary.notification_failures,
        "daily run finished"
    );
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let lookbacks = &config.ranking.params.lookbacks;
    let weights = &config.ranking.params.weights;
    eprintln!("\nRanking:");
    eprintln!(
        "  lookbacks: current={} short={} middle={} long={}",
        lookbacks.current, lookbacks.short, lookbacks.middle, lookbacks.long
    );
    eprintln!(
        "  weights:   current={} short={} middle={} long={} (sum {:.2})",
        weights.current,
        weights.short,
        weights.middle,
        weights.long,
        weights.sum()
    );
    if !config.ranking.weights_balanced() {
        eprintln!("  warning: weights do not sum to 1");
    }
    eprintln!("  top_count: {}", config.ranking.top_count);
    eprintln!("  ignored:   {}", config.ranking.ignore.len());

    eprintln!("\nStorage:");
    eprintln!("  root:      {}", config.storage.result_path.display());
    eprintln!("  retention: {} days", config.storage.retention_days);

    eprintln!("\nSource:");
    match &config.source {
        SourceConfig::Binance { base_url } => eprintln!("  binance:   {base_url}"),
        SourceConfig::Replay { date } => eprintln!("  replay:    {date}"),
    }
    eprintln!(
        "\nTelegram: {}",
        if config.telegram.is_some() { "enabled" } else { "disabled" }
    );

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}
