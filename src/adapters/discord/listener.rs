use crate::adapters::discord::client::{DiscordClient, DiscordMessage};
use crate::config::toml_config::MIN_POLL_INTERVAL;
use crate::core::bridge::{RelayBridge, RouteOutcome};
use crate::domain::model::Message;
use crate::utils::error::{Result, WhisperError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const PAGE_SIZE: u8 = 50;

/// Polls a Discord channel and routes new human messages into the bridge.
///
/// The first poll only records the newest message id, so history from before
/// startup is never replayed.
pub struct DiscordChatListener {
    client: DiscordClient,
    channel_id: String,
    source: String,
    bridge: Arc<RelayBridge>,
    last_seen: Option<String>,
    baselined: bool,
}

impl DiscordChatListener {
    /// `source` is the id of the endpoint posting into the same channel, so
    /// routed messages are not echoed back there.
    pub fn new(
        client: DiscordClient,
        channel_id: impl Into<String>,
        source: impl Into<String>,
        bridge: Arc<RelayBridge>,
    ) -> Self {
        Self {
            client,
            channel_id: channel_id.into(),
            source: source.into(),
            bridge,
            last_seen: None,
            baselined: false,
        }
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    /// Fetches one page of new messages and routes them oldest first.
    /// Returns how many messages were handed to the bridge.
    pub async fn poll_once(&mut self) -> Result<usize> {
        if !self.baselined {
            let latest = self.client.messages_after(&self.channel_id, None, 1).await?;
            self.last_seen = latest.into_iter().map(|m| m.id).max_by_key(|id| snowflake(id));
            self.baselined = true;
            tracing::debug!(
                "Listening on channel {} after message {:?}",
                self.channel_id,
                self.last_seen
            );
            return Ok(0);
        }

        let mut page = self
            .client
            .messages_after(&self.channel_id, self.last_seen.as_deref(), PAGE_SIZE)
            .await?;
        page.sort_by_key(|m| snowflake(&m.id));

        let mut routed = 0;
        for message in page {
            self.last_seen = Some(message.id.clone());
            let Some(message) = self.to_relay_message(message) else {
                continue;
            };

            match self.bridge.route_message(message).await {
                Ok(RouteOutcome::Delivered(_)) => routed += 1,
                Ok(RouteOutcome::Filtered) => {}
                Err(WhisperError::NotRunning) => return Err(WhisperError::NotRunning),
                Err(e) => {
                    routed += 1;
                    tracing::warn!("Failed to relay Discord message: {}", e);
                }
            }
        }

        Ok(routed)
    }

    fn to_relay_message(&self, message: DiscordMessage) -> Option<Message> {
        if !message.is_from_human() || message.content.trim().is_empty() {
            return None;
        }
        let timestamp = message.timestamp.unwrap_or_else(Utc::now);
        Some(
            Message::at(
                self.source.clone(),
                message.author.username,
                message.content,
                timestamp,
            )
            .with_sender_id(message.author.id),
        )
    }

    /// Polls until the bridge stops. Transient errors are logged and retried
    /// on the next tick. Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub async fn run(mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.bridge.is_running() {
                break;
            }
            match self.poll_once().await {
                Ok(_) => {}
                Err(WhisperError::NotRunning) => break,
                Err(e) if e.is_retryable() => {
                    tracing::debug!("Discord poll failed, will retry: {}", e);
                }
                Err(e) => {
                    tracing::error!("❌ Discord poll failed: {}", e);
                    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                }
            }
        }

        tracing::info!("Stopped listening on channel {}", self.channel_id);
    }
}

/// Snowflakes grow with time; non-numeric ids sort first.
fn snowflake(id: &str) -> u64 {
    id.parse().unwrap_or(0)
}
