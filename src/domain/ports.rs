use crate::domain::model::Message;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A destination registered on a bridge: a Discord channel, the in-game
/// player list, a console.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn send_message(&self, message: &Message) -> Result<()>;

    /// Stable id; also used as the `source` of messages this endpoint produces.
    fn id(&self) -> &str;

    /// Inactive endpoints stay registered but receive nothing.
    fn is_active(&self) -> bool {
        true
    }
}

/// One side of a pairwise duplex link.
#[async_trait]
pub trait DuplexNode: Send + Sync {
    async fn send_message(&self, message: &Message) -> Result<()>;

    fn id(&self) -> &str;
}

/// The host game server's view of "everyone currently online".
#[async_trait]
pub trait PlayerAudience: Send + Sync {
    async fn broadcast(&self, line: &str) -> Result<()>;
}
