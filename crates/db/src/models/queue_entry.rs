//! Queue entry entity model, DTOs and joined views.

use queuedesk_core::queue::QueueStatus;
use queuedesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `queue_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueEntry {
    pub id: DbId,
    pub ticket_id: Uuid,
    pub counter_id: DbId,
    pub token_number: i64,
    /// 1-based rank in the counter's waiting set; 0 once called or served.
    pub position_in_queue: i32,
    pub status_id: i16,
    pub user_id: Option<DbId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub estimated_wait_minutes: Option<i32>,
    pub served_by: Option<DbId>,
    pub joined_at: Timestamp,
    pub called_at: Option<Timestamp>,
    pub served_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QueueEntry {
    /// Typed status. Rows carry only seeded status IDs, so unknown IDs
    /// are treated as served (terminal).
    pub fn status(&self) -> QueueStatus {
        QueueStatus::from_id(self.status_id).unwrap_or(QueueStatus::Served)
    }
}

/// DTO for joining the queue. The counter is chosen by the repository.
#[derive(Debug, Clone)]
pub struct JoinQueue {
    pub user_id: Option<DbId>,
    pub customer_name: String,
    pub customer_phone: String,
}

/// A queue entry joined with its counter, as shown to the ticket holder.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: DbId,
    pub ticket_id: Uuid,
    pub token_number: i64,
    pub position_in_queue: i32,
    pub status_id: i16,
    pub estimated_wait_minutes: Option<i32>,
    pub counter_id: DbId,
    pub counter_number: i32,
    pub counter_name: String,
    pub joined_at: Timestamp,
    pub called_at: Option<Timestamp>,
    pub served_at: Option<Timestamp>,
}

impl TicketRow {
    pub fn status(&self) -> QueueStatus {
        QueueStatus::from_id(self.status_id).unwrap_or(QueueStatus::Served)
    }
}

/// A waiting entry as listed for staff. Missing customer details fall back
/// to guest placeholders.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WaitingEntryView {
    pub id: DbId,
    pub token_number: i64,
    pub position_in_queue: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub user_id: Option<DbId>,
    pub estimated_wait_minutes: Option<i32>,
    pub joined_at: Timestamp,
}
