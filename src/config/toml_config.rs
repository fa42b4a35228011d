use crate::utils::error::{Result, WhisperError};
use crate::utils::validation::{
    validate_bot_token, validate_discord_id, validate_http_url, validate_log_path,
    validate_poll_interval, validate_template, validate_webhook_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

const REQUIRED_KEYS: &[&str] = &[
    "discord.token",
    "discord.guild_id",
    "discord.chat_channel_id",
    "minecraft.enable_chat_bridge",
    "minecraft.chat_format",
    "minecraft.discord_to_mc_format",
    "minecraft.show_join_leave",
    "webhook.formatting.username_format",
    "webhook.formatting.avatar_url",
    "logging.log_to_file",
    "logging.log_file_path",
];

/// Fully loaded application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeContext {
    pub discord: DiscordConfig,
    pub minecraft: MinecraftConfig,
    pub webhook: WebhookConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    pub guild_id: String,
    pub chat_channel_id: String,
    pub events_channel_id: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinecraftConfig {
    pub enable_chat_bridge: bool,
    /// Game chat as rendered in Discord.
    pub chat_format: String,
    /// Discord chat as rendered in game.
    pub discord_to_mc_format: String,
    pub show_join_leave: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub formatting: WebhookFormatting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookFormatting {
    pub username_format: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_to_file: bool,
    pub log_file_path: String,
    #[serde(default)]
    pub json: bool,
    pub level: Option<String>,
}

impl DiscordConfig {
    /// Never shorter than [`MIN_POLL_INTERVAL`], even for unvalidated configs.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
            .max(MIN_POLL_INTERVAL)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
    }

    /// The events channel, unless it is unset, blank, or the chat channel itself.
    pub fn events_channel_id(&self) -> Option<&str> {
        self.events_channel_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != self.chat_channel_id)
    }
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }
}

impl RuntimeContext {
    /// Loads and parses a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        ConfigReader::with_path(path.as_ref()).load()
    }

    /// Parses configuration text, substituting `${VAR}` from the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_vars(content, |name| std::env::var(name).ok())?;

        let table: toml::Table =
            toml::from_str(&processed_content).map_err(|e| WhisperError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Self::validate_keys(&table)?;

        toml::from_str(&processed_content).map_err(|e| WhisperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn validate_keys(table: &toml::Table) -> Result<()> {
        for key in REQUIRED_KEYS {
            if !contains_dotted(table, key) {
                return Err(WhisperError::MissingConfigError {
                    field: key.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_bot_token("discord.token", &self.discord.token)?;
        validate_discord_id("discord.guild_id", &self.discord.guild_id)?;
        validate_discord_id("discord.chat_channel_id", &self.discord.chat_channel_id)?;
        if let Some(events) = self.discord.events_channel_id() {
            validate_discord_id("discord.events_channel_id", events)?;
        }
        if let Some(interval) = self.discord.poll_interval_ms {
            validate_poll_interval("discord.poll_interval_ms", interval, MIN_POLL_INTERVAL)?;
        }
        if let Some(base) = &self.discord.api_base_url {
            validate_http_url("discord.api_base_url", base)?;
        }

        validate_template("minecraft.chat_format", &self.minecraft.chat_format)?;
        validate_template(
            "minecraft.discord_to_mc_format",
            &self.minecraft.discord_to_mc_format,
        )?;

        if let Some(url) = &self.webhook.url {
            validate_webhook_url("webhook.url", url)?;
        }
        validate_template(
            "webhook.formatting.username_format",
            &self.webhook.formatting.username_format,
        )?;

        if self.logging.log_to_file {
            validate_log_path("logging.log_file_path", &self.logging.log_file_path)?;
        }
        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(WhisperError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl Validate for RuntimeContext {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Replaces `${NAME}` with `lookup(NAME)`. Unknown names are left verbatim so
/// validation can point at them.
fn substitute_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = regex::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| WhisperError::config(format!("invalid substitution pattern: {}", e)))?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

fn contains_dotted(table: &toml::Table, dotted: &str) -> bool {
    let mut parts = dotted.split('.').peekable();
    let mut current = table;
    while let Some(part) = parts.next() {
        match current.get(part) {
            Some(value) if parts.peek().is_none() => return !matches!(value, toml::Value::Table(_)),
            Some(toml::Value::Table(next)) => current = next,
            _ => return false,
        }
    }
    false
}

/// Reads `config.toml` from a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigReader {
    config_path: PathBuf,
}

impl ConfigReader {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_CONFIG_PATH)
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reads and parses the file. Does not run [`Validate`]; callers decide
    /// when to reject semantically invalid values.
    pub fn load(&self) -> Result<RuntimeContext> {
        let absolute = std::path::absolute(&self.config_path)
            .unwrap_or_else(|_| self.config_path.clone());

        let content = std::fs::read_to_string(&self.config_path).map_err(|e| {
            WhisperError::config(format!(
                "Failed to read configuration file at {}: {}",
                absolute.display(),
                e
            ))
        })?;

        let context = RuntimeContext::from_toml_str(&content)?;
        tracing::info!("Configuration loaded successfully from {}", absolute.display());
        Ok(context)
    }
}

impl Default for ConfigReader {
    fn default() -> Self {
        Self::new()
    }
}
