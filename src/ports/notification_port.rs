//! Notification sink port trait.

use crate::domain::error::RsError;
use std::path::PathBuf;

/// Ranking message: a short caption plus the watchlist file it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingNotice {
    pub caption: String,
    pub attachment: PathBuf,
}

pub trait NotificationPort {
    fn send_ranking(&self, notice: &RankingNotice) -> Result<(), RsError>;

    fn send_universe_change(&self, message: &str) -> Result<(), RsError>;
}
