// Domain layer: messages, game events and the ports adapters implement.

pub mod model;
pub mod ports;
