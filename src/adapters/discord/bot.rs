use crate::adapters::discord::client::{DiscordClient, DiscordUser, Guild, TextChannel};
use crate::config::toml_config::DiscordConfig;
use crate::utils::error::{Result, WhisperError};

/// Lifecycle of the Discord side: token check on start, guild lookup and
/// channel resolution.
#[derive(Debug)]
pub struct DiscordBot {
    client: DiscordClient,
    config: DiscordConfig,
    user: Option<DiscordUser>,
    guild: Option<Guild>,
}

impl DiscordBot {
    pub fn new(config: DiscordConfig) -> Result<Self> {
        let client = DiscordClient::new(config.api_base_url(), config.token.clone())?;
        Ok(Self {
            client,
            config,
            user: None,
            guild: None,
        })
    }

    /// Verifies the token and looks up the configured guild.
    ///
    /// A missing guild is logged, not fatal: channel lookups will then fail
    /// on their own with a clearer error.
    pub async fn start(&mut self) -> Result<()> {
        let user = self.client.current_user().await?;
        tracing::info!("🤖 Authenticated as {} ({})", user.username, user.id);
        self.user = Some(user);

        match self.client.guild(&self.config.guild_id).await {
            Ok(guild) => {
                tracing::info!("Successfully connected to guild: {}", guild.name);
                self.guild = Some(guild);
            }
            Err(WhisperError::DiscordError { status, .. }) if status == 403 || status == 404 => {
                tracing::warn!("Guild with ID '{}' not found", self.config.guild_id);
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    pub fn shutdown(&mut self) {
        if self.user.take().is_some() {
            self.guild = None;
            tracing::info!("Attempting to shut down Discord bot.");
        }
    }

    pub fn is_started(&self) -> bool {
        self.user.is_some()
    }

    pub fn client(&self) -> &DiscordClient {
        &self.client
    }

    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    pub fn user(&self) -> Option<&DiscordUser> {
        self.user.as_ref()
    }

    pub fn guild(&self) -> Option<&Guild> {
        self.guild.as_ref()
    }

    /// Resolves a text channel that belongs to the configured guild.
    ///
    /// Returns `Ok(None)` when the channel is unknown, invisible to the bot,
    /// not a text channel, or in another guild.
    pub async fn text_channel(&self, channel_id: &str) -> Result<Option<TextChannel>> {
        let channel = match self.client.channel(channel_id).await {
            Ok(channel) => channel,
            Err(WhisperError::DiscordError { status, .. }) if status == 403 || status == 404 => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };

        if !channel.is_text() {
            tracing::warn!("Channel {} is not a text channel (type {})", channel_id, channel.kind);
            return Ok(None);
        }
        if channel.guild_id.as_deref() != Some(self.config.guild_id.as_str()) {
            tracing::warn!(
                "Channel {} does not belong to guild {}",
                channel_id,
                self.config.guild_id
            );
            return Ok(None);
        }

        Ok(Some(channel))
    }
}
