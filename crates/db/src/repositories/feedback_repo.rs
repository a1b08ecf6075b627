//! Repository for the `feedback` table.

use queuedesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::feedback::{CreateFeedback, Feedback, FeedbackWithCounter};

const COLUMNS: &str = "id, queue_entry_id, counter_id, rating, comments, customer_name, \
                       customer_phone, created_at, updated_at";

/// Default page size for a single counter's feedback.
pub const DEFAULT_COUNTER_FEEDBACK_LIMIT: i64 = 20;

/// Default page size for the admin feedback listing.
pub const DEFAULT_RECENT_FEEDBACK_LIMIT: i64 = 50;

/// Customer ratings of served tickets.
pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Record feedback. A second rating for the same entry violates
    /// `uq_feedback_queue_entry_id`.
    pub async fn create(pool: &PgPool, input: &CreateFeedback) -> Result<Feedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO feedback
                (queue_entry_id, counter_id, rating, comments, customer_name, customer_phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(input.queue_entry_id)
            .bind(input.counter_id)
            .bind(input.rating)
            .bind(&input.comments)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .fetch_one(pool)
            .await
    }

    /// Feedback already recorded for a queue entry, if any.
    pub async fn find_by_entry(
        pool: &PgPool,
        queue_entry_id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedback WHERE queue_entry_id = $1");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(queue_entry_id)
            .fetch_optional(pool)
            .await
    }

    /// Newest feedback for one counter.
    pub async fn list_for_counter(
        pool: &PgPool,
        counter_id: DbId,
        limit: i64,
    ) -> Result<Vec<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedback
             WHERE counter_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(counter_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Newest feedback across all counters, with counter number and name.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedbackWithCounter>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackWithCounter>(
            "SELECT f.id, f.queue_entry_id, f.counter_id,
                    c.counter_number, c.name AS counter_name,
                    f.rating, f.comments, f.customer_name, f.customer_phone, f.created_at
             FROM feedback f
             LEFT JOIN counters c ON c.id = f.counter_id
             ORDER BY f.created_at DESC, f.id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
