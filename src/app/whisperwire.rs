use crate::adapters::discord::DiscordBot;
use crate::config::toml_config::{ConfigReader, RuntimeContext};
use crate::utils::error::{Result, WhisperError};
use crate::utils::validation::Validate;
use std::path::Path;

/// Application root: owns the loaded configuration and the Discord bot.
#[derive(Debug)]
pub struct WhisperWire {
    context: RuntimeContext,
    bot: DiscordBot,
}

impl WhisperWire {
    /// Reads, parses and validates the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let context = ConfigReader::with_path(path.as_ref()).load()?;
        Self::from_context(context)
    }

    pub fn from_context(context: RuntimeContext) -> Result<Self> {
        context.validate()?;
        let bot = DiscordBot::new(context.discord.clone())?;
        Ok(Self { context, bot })
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.bot.is_started() {
            return Err(WhisperError::AlreadyRunning);
        }
        tracing::info!("🚀 Starting WhisperWire v{}", env!("CARGO_PKG_VERSION"));
        self.bot.start().await
    }

    pub fn shutdown(&mut self) {
        self.bot.shutdown();
        tracing::info!("👋 WhisperWire stopped");
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    pub fn bot(&self) -> &DiscordBot {
        &self.bot
    }
}
