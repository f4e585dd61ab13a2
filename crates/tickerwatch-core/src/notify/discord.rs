use reqwest::Client;
use serde::Serialize;

use super::Notifier;
use crate::config::DiscordConfig;
use crate::{Error, Result};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
}

/// Discord notifier posting through the bot REST API
pub struct DiscordNotifier {
    client: Client,
    bot_token: String,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig) -> Result<Self> {
        let bot_token = config
            .bot_token
            .clone()
            .ok_or_else(|| Error::Config("Discord bot token not configured".to_string()))?;

        Ok(Self {
            client: Client::new(),
            bot_token,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: &str, message: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", DISCORD_API_BASE, channel_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&CreateMessageRequest { content: message })
            .send()
            .await
            .map_err(|e| Error::Notify(format!("Discord request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notify(format!(
                "Discord returned {} for channel {}: {}",
                status, channel_id, body
            )));
        }

        Ok(())
    }
}
