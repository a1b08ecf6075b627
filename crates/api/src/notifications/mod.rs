//! Live queue notifications over WebSocket.
//!
//! [`QueueNotifier`] consumes the event bus and pushes counter, ticket and
//! "almost your turn" messages to subscribed connections.

pub mod router;

pub use router::QueueNotifier;
