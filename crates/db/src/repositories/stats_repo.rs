//! Aggregate queries for the admin dashboard.

use queuedesk_core::queue::QueueStatus;
use sqlx::PgPool;

use crate::models::stats::{CounterStats, QueueTotals};

pub struct StatsRepo;

impl StatsRepo {
    /// Entry counts by status across every counter.
    pub async fn totals(pool: &PgPool) -> Result<QueueTotals, sqlx::Error> {
        sqlx::query_as::<_, QueueTotals>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status_id = $1) AS waiting,
                    COUNT(*) FILTER (WHERE status_id = $2) AS called,
                    COUNT(*) FILTER (WHERE status_id = $3) AS served
             FROM queue_entries",
        )
        .bind(QueueStatus::Waiting.id())
        .bind(QueueStatus::Called.id())
        .bind(QueueStatus::Served.id())
        .fetch_one(pool)
        .await
    }

    /// Waiting and served counts plus feedback summary for each counter.
    pub async fn per_counter(pool: &PgPool) -> Result<Vec<CounterStats>, sqlx::Error> {
        sqlx::query_as::<_, CounterStats>(
            "SELECT c.id AS counter_id, c.counter_number, c.name, c.is_active,
                    COALESCE(q.waiting, 0) AS waiting,
                    COALESCE(q.served, 0) AS served,
                    COALESCE(f.feedback_count, 0) AS feedback_count,
                    f.average_rating
             FROM counters c
             LEFT JOIN (
                 SELECT counter_id,
                        COUNT(*) FILTER (WHERE status_id = $1) AS waiting,
                        COUNT(*) FILTER (WHERE status_id = $2) AS served
                 FROM queue_entries
                 GROUP BY counter_id
             ) q ON q.counter_id = c.id
             LEFT JOIN (
                 SELECT counter_id,
                        COUNT(*) AS feedback_count,
                        AVG(rating)::FLOAT8 AS average_rating
                 FROM feedback
                 GROUP BY counter_id
             ) f ON f.counter_id = c.id
             ORDER BY c.counter_number",
        )
        .bind(QueueStatus::Waiting.id())
        .bind(QueueStatus::Served.id())
        .fetch_all(pool)
        .await
    }
}
