pub mod bridge;
pub mod filter;
pub mod format;
pub mod link;
pub mod predicate;
pub mod stats;
pub mod transformer;

pub use crate::domain::model::{GameEvent, Message, Player};
pub use crate::domain::ports::{DuplexNode, Endpoint, PlayerAudience};
pub use crate::utils::error::Result;
