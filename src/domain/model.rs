use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message travelling between endpoints.
///
/// `source` is the id of the endpoint or node the message came from, e.g.
/// `discord-123` or `minecraft-global`. It is what the bridge uses to avoid
/// echoing a message back to where it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub source: String,
    pub username: String,
    pub raw_message: String,
    pub timestamp: DateTime<Utc>,
    /// Stable sender id (player UUID or Discord user id), when known.
    pub sender_id: Option<String>,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn of(
        source: impl Into<String>,
        username: impl Into<String>,
        raw_message: impl Into<String>,
    ) -> Self {
        Self::at(source, username, raw_message, Utc::now())
    }

    pub fn at(
        source: impl Into<String>,
        username: impl Into<String>,
        raw_message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            username: username.into(),
            raw_message: raw_message.into(),
            timestamp,
            sender_id: None,
        }
    }

    pub fn with_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    pub fn with_raw_message(mut self, raw_message: impl Into<String>) -> Self {
        self.raw_message = raw_message.into();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.raw_message.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub username: String,
    pub uuid: String,
}

impl Player {
    pub fn new(username: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            uuid: uuid.into(),
        }
    }
}

/// Events a game server host feeds into the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Chat { player: Player, message: String },
    Join { player: Player },
    Leave { player: Player },
}

impl GameEvent {
    pub fn player(&self) -> &Player {
        match self {
            Self::Chat { player, .. } | Self::Join { player } | Self::Leave { player } => player,
        }
    }
}
