use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhisperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration key: '{field}'")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Discord rejected the bot token")]
    InvalidToken,

    #[error("Discord API error ({status}): {message}")]
    DiscordError { status: u16, message: String },

    #[error("Discord channel with ID {channel_id} not found")]
    ChannelNotFound { channel_id: String },

    #[error("Chat bridge is disabled in configuration")]
    ChatBridgeDisabled,

    #[error("Bridge is already running")]
    AlreadyRunning,

    #[error("Bridge is not running")]
    NotRunning,

    #[error("Node id must not be blank")]
    BlankNodeId,

    #[error("Cannot link nodes with identical IDs: {0}")]
    IdenticalNodes(String),

    #[error("Node is not part of this link: {0}")]
    UnknownNode(String),

    #[error("Delivery to '{endpoint}' failed: {reason}")]
    DeliveryError { endpoint: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Discord,
    Relay,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WhisperError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ChatBridgeDisabled => ErrorCategory::Configuration,
            Self::HttpError(_) => ErrorCategory::Network,
            Self::InvalidToken | Self::DiscordError { .. } | Self::ChannelNotFound { .. } => {
                ErrorCategory::Discord
            }
            Self::AlreadyRunning
            | Self::NotRunning
            | Self::BlankNodeId
            | Self::IdenticalNodes(_)
            | Self::UnknownNode(_)
            | Self::DeliveryError { .. } => ErrorCategory::Relay,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ChatBridgeDisabled => ErrorSeverity::Low,
            Self::HttpError(_) | Self::DeliveryError { .. } => ErrorSeverity::Medium,
            Self::DiscordError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Check config.toml syntax and field values"
            }
            Self::MissingConfigError { .. } => "Add the missing key to config.toml",
            Self::InvalidConfigValueError { .. } => "Correct the highlighted configuration value",
            Self::InvalidToken => "Regenerate the bot token in the Discord developer portal",
            Self::ChannelNotFound { .. } => {
                "Verify discord.chat_channel_id and that the bot can see the channel"
            }
            Self::DiscordError { .. } => "Check bot permissions in the target guild",
            Self::HttpError(_) => "Check network connectivity to Discord",
            Self::ChatBridgeDisabled => "Set minecraft.enable_chat_bridge = true to relay chat",
            Self::AlreadyRunning | Self::NotRunning => "Restart the bridge",
            Self::BlankNodeId | Self::IdenticalNodes(_) | Self::UnknownNode(_) => {
                "Link only distinct, registered nodes"
            }
            Self::DeliveryError { .. } => "The message will not be retried; check the endpoint",
            Self::IoError(_) => "Check file permissions and paths",
            Self::SerializationError(_) => "Unexpected payload from Discord; check API version",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach Discord: {}", self),
            ErrorCategory::Discord => format!("Discord refused the request: {}", self),
            ErrorCategory::Relay => format!("Relay failure: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, WhisperError>;
