//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod counter;
pub mod feedback;
pub mod queue_entry;
pub mod queue_event;
pub mod session;
pub mod stats;
pub mod user;
