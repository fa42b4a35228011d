use crate::core::bridge::RelayBridge;
use crate::core::link::LinkManager;
use crate::domain::model::{GameEvent, Message};
use crate::domain::ports::DuplexNode;
use crate::utils::error::{Result, WhisperError};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const JOIN_TEXT: &str = "joined the game";
pub const LEAVE_TEXT: &str = "left the game";

/// Turns game server events into relay messages.
///
/// Chat always goes through the bridge. Join and leave notices are only sent
/// when enabled, and prefer the node's duplex links (the events channel) over
/// the bridge.
pub struct GameChatListener {
    bridge: Arc<RelayBridge>,
    links: Arc<LinkManager>,
    node: Arc<dyn DuplexNode>,
    show_join_leave: bool,
}

impl GameChatListener {
    pub fn new(
        bridge: Arc<RelayBridge>,
        links: Arc<LinkManager>,
        node: Arc<dyn DuplexNode>,
        show_join_leave: bool,
    ) -> Self {
        Self {
            bridge,
            links,
            node,
            show_join_leave,
        }
    }

    pub async fn handle(&self, event: GameEvent) -> Result<()> {
        let source = self.node.id().to_string();
        match event {
            GameEvent::Chat { player, message } => {
                let message = Message::of(source, player.username, message)
                    .with_sender_id(player.uuid);
                self.bridge.route_message(message).await?;
            }
            GameEvent::Join { player } | GameEvent::Leave { player } if !self.show_join_leave => {
                tracing::trace!("Join/leave relay disabled, ignoring {}", player.username);
            }
            GameEvent::Join { player } => {
                let message = Message::of(source, player.username, JOIN_TEXT);
                self.announce(message.with_sender_id(player.uuid)).await?;
            }
            GameEvent::Leave { player } => {
                let message = Message::of(source, player.username, LEAVE_TEXT);
                self.announce(message.with_sender_id(player.uuid)).await?;
            }
        }
        Ok(())
    }

    async fn announce(&self, message: Message) -> Result<()> {
        if self.links.has_links(self.node.as_ref()) {
            self.links.relay(self.node.as_ref(), &message).await?;
        } else {
            self.bridge.route_message(message).await?;
        }
        Ok(())
    }

    /// Consumes events until the sender side closes or the bridge stops.
    pub async fn run(self, mut events: mpsc::Receiver<GameEvent>) {
        while let Some(event) = events.recv().await {
            match self.handle(event).await {
                Ok(()) => {}
                Err(WhisperError::NotRunning) => break,
                Err(e) => tracing::warn!("Failed to relay game event: {}", e),
            }
        }
        tracing::info!("Game event stream closed");
    }
}
