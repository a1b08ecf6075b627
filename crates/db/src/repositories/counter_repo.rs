//! Repository for the `counters` table.

use queuedesk_core::queue::QueueStatus;
use queuedesk_core::types::DbId;
use sqlx::PgPool;

use crate::error::QueueError;
use crate::models::counter::{Counter, CounterOverview, CreateCounter, UpdateCounter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, counter_number, name, is_active, current_staff_id, created_at, updated_at";

/// `$1` waiting status, `$2` called status, `$3` optional counter filter.
const OVERVIEW_QUERY: &str = "\
    SELECT c.id AS counter_id, c.counter_number, c.name,
           COUNT(q.id) FILTER (WHERE q.status_id = $1) AS waiting,
           MAX(q.token_number) FILTER (WHERE q.status_id = $2) AS now_serving_token
    FROM counters c
    LEFT JOIN queue_entries q
           ON q.counter_id = c.id AND q.status_id IN ($1, $2)
    WHERE c.is_active = true AND ($3::BIGINT IS NULL OR c.id = $3)
    GROUP BY c.id
    ORDER BY c.counter_number";

/// Provides CRUD operations for service counters.
pub struct CounterRepo;

impl CounterRepo {
    /// Insert a new counter, returning the created row.
    ///
    /// A duplicate `counter_number` violates `uq_counters_counter_number`.
    pub async fn create(pool: &PgPool, input: &CreateCounter) -> Result<Counter, sqlx::Error> {
        let query = format!(
            "INSERT INTO counters (counter_number, name, is_active)
             VALUES ($1, $2, COALESCE($3, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Counter>(&query)
            .bind(input.counter_number)
            .bind(input.name.trim())
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a counter by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Counter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM counters WHERE id = $1");
        sqlx::query_as::<_, Counter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List counters ordered by number. Inactive counters are skipped unless
    /// `include_inactive` is set.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Counter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM counters
             WHERE is_active = true OR $1
             ORDER BY counter_number"
        );
        sqlx::query_as::<_, Counter>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a counter. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCounter,
    ) -> Result<Option<Counter>, sqlx::Error> {
        let query = format!(
            "UPDATE counters SET
                counter_number = COALESCE($2, counter_number),
                name = COALESCE($3, name),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Counter>(&query)
            .bind(id)
            .bind(input.counter_number)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a counter that has never held a queue entry.
    ///
    /// Counters with waiting or called customers are busy. Counters whose
    /// line has emptied still own served tickets and their feedback, so
    /// they can only be deactivated. Returns `false` if the counter does
    /// not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, QueueError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM counters WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        let (active, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status_id IN ($2, $3)), COUNT(*)
             FROM queue_entries
             WHERE counter_id = $1",
        )
        .bind(id)
        .bind(QueueStatus::Waiting.id())
        .bind(QueueStatus::Called.id())
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(QueueError::CounterBusy(id));
        }
        if total > 0 {
            return Err(QueueError::CounterHasHistory(id));
        }

        let result = sqlx::query("DELETE FROM counters WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record which staff member operates a counter.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn assign_staff(
        pool: &PgPool,
        id: DbId,
        staff_id: DbId,
    ) -> Result<Option<Counter>, sqlx::Error> {
        let query = format!(
            "UPDATE counters SET current_staff_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Counter>(&query)
            .bind(id)
            .bind(staff_id)
            .fetch_optional(pool)
            .await
    }

    /// Display-board view: waiting count and current token per active counter.
    pub async fn overview(pool: &PgPool) -> Result<Vec<CounterOverview>, sqlx::Error> {
        sqlx::query_as::<_, CounterOverview>(OVERVIEW_QUERY)
            .bind(QueueStatus::Waiting.id())
            .bind(QueueStatus::Called.id())
            .bind(None::<DbId>)
            .fetch_all(pool)
            .await
    }

    /// Board row for one counter. `None` if it is missing or inactive.
    pub async fn overview_for(
        pool: &PgPool,
        counter_id: DbId,
    ) -> Result<Option<CounterOverview>, sqlx::Error> {
        sqlx::query_as::<_, CounterOverview>(OVERVIEW_QUERY)
            .bind(QueueStatus::Waiting.id())
            .bind(QueueStatus::Called.id())
            .bind(Some(counter_id))
            .fetch_optional(pool)
            .await
    }
}
