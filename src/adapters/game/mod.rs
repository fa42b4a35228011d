pub mod audience;
pub mod endpoint;
pub mod listener;

pub use audience::ChannelAudience;
pub use endpoint::{GameEndpoint, GAME_ENDPOINT_ID};
pub use listener::GameChatListener;
