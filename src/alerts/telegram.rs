//! Telegram Bot API alerter.
//!
//! API docs: https://core.telegram.org/bots/api#sendmessage
//! Enabled only when both the bot token and chat id env vars are set.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use tracing::{debug, info};

use super::HitAlerter;
use crate::config::{AlertsConfig, AppConfig};
use crate::types::HitRecord;

const BASE_URL: &str = "https://api.telegram.org";

pub struct TelegramAlerter {
    http: Client,
    bot_token: Secret<String>,
    chat_id: String,
    base_url: String,
}

impl TelegramAlerter {
    pub fn new(bot_token: Secret<String>, chat_id: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for Telegram")?;

        Ok(Self {
            http,
            bot_token,
            chat_id,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Build from config. `Ok(None)` when either env var is missing.
    pub fn from_config(cfg: &AlertsConfig) -> Result<Option<Self>> {
        let token = AppConfig::resolve_env(&cfg.telegram_bot_token_env).ok();
        let chat_id = AppConfig::resolve_env(&cfg.telegram_chat_id_env).ok();

        match (token, chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                info!("Telegram hit alerts enabled");
                Ok(Some(Self::new(Secret::new(token), chat_id)?))
            }
            _ => {
                debug!("Telegram hit alerts disabled");
                Ok(None)
            }
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn send_url(&self, text: &str) -> String {
        format!(
            "{}/bot{}/sendMessage?chat_id={}&text={}",
            self.base_url,
            self.bot_token.expose_secret(),
            urlencoding::encode(&self.chat_id),
            urlencoding::encode(text),
        )
    }
}

/// Human-readable alert body.
pub fn format_hit(hit: &HitRecord) -> String {
    format!(
        "HIT ({}): {} ETH at {} [{}]",
        hit.source, hit.balance, hit.address, hit.entropy_summary
    )
}

#[async_trait]
impl HitAlerter for TelegramAlerter {
    async fn notify(&self, hit: &HitRecord) -> Result<()> {
        let resp = self
            .http
            .post(self.send_url(&format_hit(hit)))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Telegram request failed: {}", e.without_url()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Telegram API error {status}");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
