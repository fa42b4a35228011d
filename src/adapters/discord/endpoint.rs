use crate::adapters::discord::client::{AllowedMentions, DiscordClient, WebhookPayload};
use crate::config::toml_config::WebhookFormatting;
use crate::core::format::render;
use crate::core::transformer::DISCORD_MAX_CONTENT;
use crate::domain::model::Message;
use crate::domain::ports::{DuplexNode, Endpoint};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Format used for join/leave notices in a dedicated events channel.
pub const EVENTS_FORMAT: &str = "**[{username}]** {message}";

#[derive(Debug, Clone)]
struct WebhookTarget {
    url: String,
    formatting: WebhookFormatting,
}

/// Posts relayed messages into one Discord text channel, either as the bot
/// or through a webhook that impersonates the sender.
#[derive(Debug)]
pub struct DiscordEndpoint {
    id: String,
    channel_id: String,
    client: DiscordClient,
    format: String,
    webhook: Option<WebhookTarget>,
    active: AtomicBool,
}

impl DiscordEndpoint {
    pub fn new(client: DiscordClient, channel_id: impl Into<String>, format: impl Into<String>) -> Self {
        let channel_id = channel_id.into();
        Self {
            id: format!("discord-{}", channel_id),
            channel_id,
            client,
            format: format.into(),
            webhook: None,
            active: AtomicBool::new(true),
        }
    }

    pub fn with_webhook(mut self, url: impl Into<String>, formatting: WebhookFormatting) -> Self {
        self.webhook = Some(WebhookTarget {
            url: url.into(),
            formatting,
        });
        self
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    async fn deliver(&self, message: &Message) -> Result<()> {
        if message.is_blank() {
            return Ok(());
        }

        match &self.webhook {
            Some(webhook) => {
                let uuid = message.sender_id.as_deref().unwrap_or(&message.username);
                let values = [("username", message.username.as_str()), ("uuid", uuid)];
                let payload = WebhookPayload {
                    content: cap(&message.raw_message),
                    username: Some(render(&webhook.formatting.username_format, &values)),
                    avatar_url: Some(render(&webhook.formatting.avatar_url, &values))
                        .filter(|url| !url.trim().is_empty()),
                    allowed_mentions: AllowedMentions::default(),
                };
                self.client.execute_webhook(&webhook.url, &payload).await
            }
            None => {
                let content = render(
                    &self.format,
                    &[
                        ("username", message.username.as_str()),
                        ("message", message.raw_message.as_str()),
                    ],
                );
                self.client
                    .send_message(&self.channel_id, &cap(&content))
                    .await?;
                Ok(())
            }
        }
    }
}

fn cap(content: &str) -> String {
    content.chars().take(DISCORD_MAX_CONTENT).collect()
}

#[async_trait]
impl Endpoint for DiscordEndpoint {
    async fn send_message(&self, message: &Message) -> Result<()> {
        self.deliver(message).await
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DuplexNode for DiscordEndpoint {
    async fn send_message(&self, message: &Message) -> Result<()> {
        self.deliver(message).await
    }

    fn id(&self) -> &str {
        &self.id
    }
}
