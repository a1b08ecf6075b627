//! Queue event bus and durable event log.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`QueueEvent`]: the envelope published after every queue or counter
//!   change.
//! - [`EventPersistence`]: background service that writes every event to the
//!   `queue_events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, QueueEvent};
pub use persistence::EventPersistence;
