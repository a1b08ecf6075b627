//! Domain types and pure queue logic for the Queuedesk service.
//!
//! This crate has no internal dependencies and performs no I/O, so the
//! repository layer, the event bus and the HTTP layer can all share it.

pub mod error;
pub mod paging;
pub mod queue;
pub mod queue_events;
pub mod roles;
pub mod types;
pub mod validation;
