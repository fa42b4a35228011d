use crate::utils::error::{Result, WhisperError};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Channel types that accept plain text messages (guild text, announcement).
const TEXT_CHANNEL_TYPES: [u8; 2] = [0, 5];

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub guild_id: Option<String>,
    pub name: Option<String>,
}

impl TextChannel {
    pub fn is_text(&self) -> bool {
        TEXT_CHANNEL_TYPES.contains(&self.kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub author: DiscordUser,
    pub webhook_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DiscordMessage {
    /// Messages from bots, system users and webhooks are never relayed;
    /// that is also what stops our own posts from echoing back.
    pub fn is_from_human(&self) -> bool {
        !self.author.bot && !self.author.system && self.webhook_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub allowed_mentions: AllowedMentions,
}

#[derive(Debug, Deserialize)]
struct RateLimited {
    retry_after: f64,
}

/// Minimal Discord REST client authenticated as a bot.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    base_url: String,
    token: String,
}

impl DiscordClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!(
                "DiscordBot (whisperwire, {})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bot {}", self.token))
    }

    pub async fn current_user(&self) -> Result<DiscordUser> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self.execute(|| self.authed(self.client.get(&url))).await?;
        Ok(response.json().await?)
    }

    pub async fn guild(&self, guild_id: &str) -> Result<Guild> {
        let url = format!("{}/guilds/{}", self.base_url, guild_id);
        let response = self.execute(|| self.authed(self.client.get(&url))).await?;
        Ok(response.json().await?)
    }

    pub async fn channel(&self, channel_id: &str) -> Result<TextChannel> {
        let url = format!("{}/channels/{}", self.base_url, channel_id);
        let response = self.execute(|| self.authed(self.client.get(&url))).await?;
        Ok(response.json().await?)
    }

    pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<DiscordMessage> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let body = CreateMessage {
            content,
            allowed_mentions: AllowedMentions::default(),
        };
        let response = self
            .execute(|| self.authed(self.client.post(&url)).json(&body))
            .await?;
        Ok(response.json().await?)
    }

    /// Messages newer than `after`, in the order Discord returns them (newest first).
    pub async fn messages_after(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<DiscordMessage>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let limit = limit.clamp(1, 100).to_string();
        let response = self
            .execute(|| {
                let mut request = self
                    .authed(self.client.get(&url))
                    .query(&[("limit", limit.as_str())]);
                if let Some(after) = after {
                    request = request.query(&[("after", after)]);
                }
                request
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Webhook URLs carry their own credentials; no bot token is sent.
    pub async fn execute_webhook(&self, webhook_url: &str, payload: &WebhookPayload) -> Result<()> {
        self.execute(|| self.client.post(webhook_url).json(payload)).await?;
        Ok(())
    }

    async fn execute<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_ATTEMPTS {
                let wait = retry_after(response).await;
                tracing::warn!(
                    "⏳ Rate limited by Discord, retrying in {:?} (attempt {}/{})",
                    wait,
                    attempt,
                    MAX_ATTEMPTS
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(WhisperError::InvalidToken);
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(WhisperError::DiscordError {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }
    }
}

async fn retry_after(response: Response) -> Duration {
    let from_header = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok());

    let seconds = match from_header {
        Some(seconds) => seconds,
        None => response
            .json::<RateLimited>()
            .await
            .map(|r| r.retry_after)
            .unwrap_or(1.0),
    };

    if !seconds.is_finite() {
        return Duration::from_secs(1);
    }
    Duration::from_secs_f64(seconds.clamp(0.0, MAX_RETRY_AFTER.as_secs_f64()))
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
