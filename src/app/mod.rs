pub mod global_bridge;
pub mod whisperwire;

pub use global_bridge::GlobalBridge;
pub use whisperwire::WhisperWire;
