//! Repository for the `queue_events` table.

use queuedesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::queue_event::QueueEventRow;

const COLUMNS: &str =
    "id, event_type, counter_id, queue_entry_id, actor_user_id, payload, created_at";

/// Default page size for the event history listing.
pub const DEFAULT_EVENT_LIMIT: i64 = 100;

/// Append-only history of published queue events.
pub struct QueueEventRepo;

impl QueueEventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        counter_id: Option<DbId>,
        queue_entry_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO queue_events \
                (event_type, counter_id, queue_entry_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(counter_id)
        .bind(queue_entry_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List recent events ordered newest-first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<QueueEventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_events \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, QueueEventRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
