use crate::domain::ports::PlayerAudience;
use crate::utils::error::{Result, WhisperError};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Hands broadcast lines to the host over a channel; the host forwards them
/// to its players.
#[derive(Debug, Clone)]
pub struct ChannelAudience {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelAudience {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl PlayerAudience for ChannelAudience {
    async fn broadcast(&self, line: &str) -> Result<()> {
        self.tx
            .send(line.to_string())
            .map_err(|_| WhisperError::DeliveryError {
                endpoint: "audience".to_string(),
                reason: "receiver closed".to_string(),
            })
    }
}
