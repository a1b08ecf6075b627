//! Persisted queue event model.

use queuedesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `queue_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueEventRow {
    pub id: DbId,
    pub event_type: String,
    pub counter_id: Option<DbId>,
    pub queue_entry_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
