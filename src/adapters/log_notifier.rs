//! Notifier that only logs. Used when Telegram is disabled or on dry runs.

use crate::domain::error::RsError;
use crate::ports::notification_port::{NotificationPort, RankingNotice};
use tracing::info;

#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationPort for LogNotifier {
    fn send_ranking(&self, notice: &RankingNotice) -> Result<(), RsError> {
        info!(
            attachment = %notice.attachment.display(),
            caption = %notice.caption,
            "ranking notification"
        );
        Ok(())
    }

    fn send_universe_change(&self, message: &str) -> Result<(), RsError> {
        info!(message = %message, "universe change notification");
        Ok(())
    }
}
