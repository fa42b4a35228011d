use crate::core::format::render;
use crate::domain::model::Message;
use crate::domain::ports::{DuplexNode, Endpoint, PlayerAudience};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Id of the single endpoint that stands for every online player.
pub const GAME_ENDPOINT_ID: &str = "minecraft-global";

/// Broadcasts relayed messages to all online players, rendered with
/// `discord_to_mc_format`.
pub struct GameEndpoint {
    audience: Arc<dyn PlayerAudience>,
    format: String,
}

impl GameEndpoint {
    pub fn new(audience: Arc<dyn PlayerAudience>, format: impl Into<String>) -> Self {
        Self {
            audience,
            format: format.into(),
        }
    }

    pub fn render(&self, message: &Message) -> String {
        render(
            &self.format,
            &[
                ("username", message.username.as_str()),
                ("message", message.raw_message.as_str()),
            ],
        )
    }

    async fn deliver(&self, message: &Message) -> Result<()> {
        if message.is_blank() {
            return Ok(());
        }
        self.audience.broadcast(&self.render(message)).await
    }
}

#[async_trait]
impl Endpoint for GameEndpoint {
    async fn send_message(&self, message: &Message) -> Result<()> {
        self.deliver(message).await
    }

    fn id(&self) -> &str {
        GAME_ENDPOINT_ID
    }
}

#[async_trait]
impl DuplexNode for GameEndpoint {
    async fn send_message(&self, message: &Message) -> Result<()> {
        self.deliver(message).await
    }

    fn id(&self) -> &str {
        GAME_ENDPOINT_ID
    }
}
