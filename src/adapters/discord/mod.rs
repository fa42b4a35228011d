pub mod bot;
pub mod client;
pub mod endpoint;
pub mod listener;

pub use bot::DiscordBot;
pub use client::DiscordClient;
pub use endpoint::DiscordEndpoint;
pub use listener::DiscordChatListener;
