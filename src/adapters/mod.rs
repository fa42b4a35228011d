// Concrete implementations of the domain ports for Discord, the game server
// host and a local console.

pub mod console;
pub mod discord;
pub mod game;
