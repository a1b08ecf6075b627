//! Customer feedback entity model and DTOs.

use queuedesk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub queue_entry_id: DbId,
    pub counter_id: Option<DbId>,
    pub rating: i16,
    pub comments: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording feedback. Counter and customer details are copied
/// from the rated entry.
#[derive(Debug)]
pub struct CreateFeedback {
    pub queue_entry_id: DbId,
    pub counter_id: Option<DbId>,
    pub rating: i16,
    pub comments: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Feedback joined with the counter it was given for (admin listing).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackWithCounter {
    pub id: DbId,
    pub queue_entry_id: DbId,
    pub counter_id: Option<DbId>,
    pub counter_number: Option<i32>,
    pub counter_name: Option<String>,
    pub rating: i16,
    pub comments: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: Timestamp,
}
