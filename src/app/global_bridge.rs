use crate::adapters::discord::endpoint::EVENTS_FORMAT;
use crate::adapters::discord::{DiscordBot, DiscordChatListener, DiscordEndpoint};
use crate::adapters::game::{GameChatListener, GameEndpoint};
use crate::config::toml_config::RuntimeContext;
use crate::core::bridge::RelayBridge;
use crate::core::filter::MessageFilter;
use crate::core::link::LinkManager;
use crate::core::transformer::{MessageTransformer, DISCORD_MAX_CONTENT};
use crate::domain::model::GameEvent;
use crate::domain::ports::{DuplexNode, Endpoint, PlayerAudience};
use crate::utils::error::{Result, WhisperError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wires the chat channel and the game together through one bridge, plus an
/// optional events channel linked to the game for join/leave notices.
pub struct GlobalBridge {
    bridge: Arc<RelayBridge>,
    links: Arc<LinkManager>,
    tasks: Vec<JoinHandle<()>>,
}

impl GlobalBridge {
    pub async fn start(
        context: &RuntimeContext,
        bot: &DiscordBot,
        audience: Arc<dyn PlayerAudience>,
        events: mpsc::Receiver<GameEvent>,
    ) -> Result<Self> {
        if !context.minecraft.enable_chat_bridge {
            tracing::info!("Chat bridge is disabled in configuration");
            return Err(WhisperError::ChatBridgeDisabled);
        }

        let discord = &context.discord;
        let chat_channel = bot
            .text_channel(&discord.chat_channel_id)
            .await?
            .ok_or_else(|| WhisperError::ChannelNotFound {
                channel_id: discord.chat_channel_id.clone(),
            })?;

        let bridge = Arc::new(RelayBridge::new());
        bridge.add_filter(MessageFilter::by_content(|content| !content.trim().is_empty()));
        bridge.add_transformer(MessageTransformer::trim());
        bridge.add_transformer(MessageTransformer::strip_mentions());
        bridge.add_transformer(MessageTransformer::truncate(DISCORD_MAX_CONTENT));

        let mut chat_endpoint = DiscordEndpoint::new(
            bot.client().clone(),
            chat_channel.id.clone(),
            context.minecraft.chat_format.clone(),
        );
        if let Some(url) = &context.webhook.url {
            chat_endpoint = chat_endpoint.with_webhook(url.clone(), context.webhook.formatting.clone());
        }
        let chat_endpoint = Arc::new(chat_endpoint);
        let chat_endpoint_id = Endpoint::id(chat_endpoint.as_ref()).to_string();

        let game = Arc::new(GameEndpoint::new(
            audience,
            context.minecraft.discord_to_mc_format.clone(),
        ));

        bridge.register_endpoint(chat_endpoint);
        bridge.register_endpoint(game.clone());
        bridge.start()?;

        let links = Arc::new(LinkManager::new());
        if let Some(events_id) = discord.events_channel_id() {
            match bot.text_channel(events_id).await? {
                Some(channel) => {
                    let events_endpoint: Arc<dyn DuplexNode> = Arc::new(DiscordEndpoint::new(
                        bot.client().clone(),
                        channel.id,
                        EVENTS_FORMAT,
                    ));
                    links.link(game.clone(), events_endpoint);
                }
                None => tracing::warn!(
                    "Events channel {} not found, join/leave goes to the chat channel",
                    events_id
                ),
            }
        }

        let listener = DiscordChatListener::new(
            bot.client().clone(),
            chat_channel.id.clone(),
            chat_endpoint_id,
            bridge.clone(),
        );
        let game_listener = GameChatListener::new(
            bridge.clone(),
            links.clone(),
            game,
            context.minecraft.show_join_leave,
        );

        let tasks = vec![
            tokio::spawn(listener.run(discord.poll_interval())),
            tokio::spawn(game_listener.run(events)),
        ];

        tracing::info!(
            "🔗 Chat bridge active on #{}",
            chat_channel.name.as_deref().unwrap_or(&chat_channel.id)
        );

        Ok(Self {
            bridge,
            links,
            tasks,
        })
    }

    pub fn bridge(&self) -> &Arc<RelayBridge> {
        &self.bridge
    }

    pub fn links(&self) -> &Arc<LinkManager> {
        &self.links
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.links.reset();
        match self.bridge.stop() {
            Ok(()) | Err(WhisperError::NotRunning) => {}
            Err(e) => tracing::warn!("Failed to stop bridge: {}", e),
        }
        tracing::info!("Chat bridge stopped");
    }
}

impl Drop for GlobalBridge {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
