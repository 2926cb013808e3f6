//! Date-partition retention.

use crate::domain::error::RsError;
use crate::ports::result_store_port::ResultStore;
use chrono::{Days, NaiveDate};
use tracing::{info, warn};

pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Partition names that parse as `YYYY-MM-DD` and fall strictly before
/// `today - keep_days`. Anything else is left alone.
pub fn expired_partitions(names: &[String], today: NaiveDate, keep_days: u32) -> Vec<String> {
    let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(keep_days))) else {
        return Vec::new();
    };
    names
        .iter()
        .filter(|name| {
            NaiveDate::parse_from_str(name, "%Y-%m-%d")
                .map(|date| date < cutoff)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Delete expired partitions. Listing failures propagate; a partition that
/// cannot be removed is logged and skipped. Returns the names removed.
pub fn prune_expired(
    store: &dyn ResultStore,
    today: NaiveDate,
    keep_days: u32,
) -> Result<Vec<String>, RsError> {
    let names = store.list_partitions()?;
    let mut removed = Vec::new();
    for name in expired_partitions(&names, today, keep_days) {
        match store.remove_partition(&name) {
            Ok(()) => removed.push(name),
            Err(e) => warn!(partition = %name, error = %e, "failed to remove expired partition"),
        }
    }
    info!(removed = removed.len(), keep_days, "retention pass complete");
    Ok(removed)
}
