//! Aggregated queue statistics for the admin dashboard.

use queuedesk_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Entry counts across all counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueTotals {
    pub total: i64,
    pub waiting: i64,
    pub called: i64,
    pub served: i64,
}

/// Per-counter breakdown.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CounterStats {
    pub counter_id: DbId,
    pub counter_number: i32,
    pub name: String,
    pub is_active: bool,
    pub waiting: i64,
    pub served: i64,
    pub feedback_count: i64,
    pub average_rating: Option<f64>,
}
