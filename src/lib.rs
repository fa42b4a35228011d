pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{GlobalBridge, WhisperWire};
pub use config::{ConfigReader, RuntimeContext};
pub use core::{bridge::RelayBridge, link::LinkManager};
pub use domain::model::{GameEvent, Message, Player};
pub use utils::error::{Result, WhisperError};
