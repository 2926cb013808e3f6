//! Telegram Bot API notifier.

use crate::domain::config::TelegramConfig;
use crate::domain::error::RsError;
use crate::ports::notification_port::{NotificationPort, RankingNotice};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Request, Response};
use std::fs;
use std::time::Duration;
use tracing::info;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn notification_error(reason: impl std::fmt::Display) -> RsError {
    RsError::Notification {
        reason: reason.to_string(),
    }
}

pub struct TelegramAdapter {
    client: Client,
    api_base: String,
    config: TelegramConfig,
}

impl TelegramAdapter {
    pub fn new(config: TelegramConfig) -> Result<Self, RsError> {
        Self::with_api_base(config, API_BASE)
    }

    pub fn with_api_base(config: TelegramConfig, api_base: &str) -> Result<Self, RsError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(notification_error)?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            config,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.config.bot_token, method)
    }

    fn check(method: &str, response: Response) -> Result<(), RsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(notification_error(format!("{method} failed: {status} {body}")))
    }

    /// sendMessage takes a url-encoded form with `chat_id` and `text`.
    fn message_request(&self, chat_id: &str, text: &str) -> Result<Request, RsError> {
        self.client
            .post(self.method_url("sendMessage"))
            .form(&[("chat_id", chat_id), ("text", text)])
            .build()
            .map_err(|e| notification_error(format!("sendMessage failed: {e}")))
    }

    fn send_message(&self, chat_id: &str, text: &str) -> Result<(), RsError> {
        let request = self.message_request(chat_id, text)?;
        let response = self
            .client
            .execute(request)
            .map_err(|e| notification_error(format!("sendMessage failed: {e}")))?;
        Self::check("sendMessage", response)?;
        info!(chat_id = %chat_id, "telegram message sent");
        Ok(())
    }
}

impl NotificationPort for TelegramAdapter {
    fn send_ranking(&self, notice: &RankingNotice) -> Result<(), RsError> {
        let bytes = fs::read(&notice.attachment).map_err(|e| {
            notification_error(format!("cannot read {}: {e}", notice.attachment.display()))
        })?;
        let file_name = notice
            .attachment
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "watchlist.txt".to_string());

        let document = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(notification_error)?;
        let form = Form::new()
            .text("chat_id", self.config.rank_chat_id.clone())
            .text("caption", notice.caption.clone())
            .part("document", document);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .map_err(|e| notification_error(format!("sendDocument failed: {e}")))?;
        Self::check("sendDocument", response)?;
        info!(chat_id = %self.config.rank_chat_id, "telegram ranking sent");
        Ok(())
    }

    fn send_universe_change(&self, message: &str) -> Result<(), RsError> {
        self.send_message(&self.config.universe_chat_id, message)
    }
}
