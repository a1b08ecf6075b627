//! WebSocket infrastructure for live queue updates.
//!
//! Customers subscribe to their ticket, display boards and staff to a
//! counter. The notifier pushes messages through [`WsManager`] by topic.

mod handler;
pub mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use manager::{Topic, WsManager};
