//! Service counter entity model and DTOs.

use queuedesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `counters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Counter {
    pub id: DbId,
    pub counter_number: i32,
    pub name: String,
    pub is_active: bool,
    /// Staff member currently operating the counter.
    pub current_staff_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a counter.
#[derive(Debug, Deserialize)]
pub struct CreateCounter {
    pub counter_number: i32,
    pub name: String,
    pub is_active: Option<bool>,
}

/// DTO for updating a counter. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCounter {
    pub counter_number: Option<i32>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Public display-board row: one per active counter.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CounterOverview {
    pub counter_id: DbId,
    pub counter_number: i32,
    pub name: String,
    pub waiting: i64,
    /// Token of the customer currently called to the counter, if any.
    pub now_serving_token: Option<i64>,
}
