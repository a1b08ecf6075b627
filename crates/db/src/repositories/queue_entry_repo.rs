//! Repository for the `queue_entries` table.
//!
//! Every mutation runs in one transaction and first locks the affected
//! `counters` row(s) with `SELECT ... FOR UPDATE`, so concurrent joins,
//! departures and calls at the same counter are serialised. Joins lock all
//! active counters in `counter_number` order; every other operation locks a
//! single counter, so lock acquisition order cannot cycle.

use queuedesk_core::queue::state_machine::validate_transition;
use queuedesk_core::queue::{
    estimate_wait_minutes, select_shortest_counter, CounterLoad, QueueSettings, QueueStatus,
    NOT_WAITING_POSITION,
};
use queuedesk_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::QueueError;
use crate::models::queue_entry::{JoinQueue, QueueEntry, TicketRow, WaitingEntryView};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ticket_id, counter_id, token_number, position_in_queue, status_id, \
                       user_id, customer_name, customer_phone, estimated_wait_minutes, served_by, \
                       joined_at, called_at, served_at, created_at, updated_at";

/// Placeholder shown to staff for customers who gave no name.
pub const GUEST_NAME: &str = "Guest Customer";
/// Placeholder shown to staff for customers who gave no phone number.
pub const GUEST_PHONE: &str = "N/A";

/// Queue operations: join, leave, call, serve and position upkeep.
pub struct QueueEntryRepo;

impl QueueEntryRepo {
    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a customer to the shortest waiting line among active counters.
    ///
    /// The new entry gets the next global token and `position = waiting + 1`.
    pub async fn join(
        pool: &PgPool,
        input: &JoinQueue,
        settings: &QueueSettings,
    ) -> Result<QueueEntry, QueueError> {
        let mut tx = pool.begin().await?;

        let counters: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT id, counter_number FROM counters \
             WHERE is_active = true \
             ORDER BY counter_number \
             FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        if counters.is_empty() {
            return Err(QueueError::NoActiveCounters);
        }

        if let Some(user_id) = input.user_id {
            if Self::has_active_entry(&mut tx, user_id).await? {
                return Err(QueueError::ActiveTicketExists);
            }
        }

        let ids: Vec<DbId> = counters.iter().map(|(id, _)| *id).collect();
        let counts: Vec<(DbId, i64)> = sqlx::query_as(
            "SELECT counter_id, COUNT(*) FROM queue_entries \
             WHERE status_id = $1 AND counter_id = ANY($2) \
             GROUP BY counter_id",
        )
        .bind(QueueStatus::Waiting.id())
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let loads: Vec<CounterLoad> = counters
            .iter()
            .map(|(counter_id, counter_number)| CounterLoad {
                counter_id: *counter_id,
                counter_number: *counter_number,
                waiting: counts
                    .iter()
                    .find(|(id, _)| id == counter_id)
                    .map(|(_, n)| *n)
                    .unwrap_or(0),
            })
            .collect();

        let chosen = select_shortest_counter(&loads).ok_or(QueueError::NoActiveCounters)?;
        let position = i32::try_from(chosen.waiting + 1)
            .map_err(|_| QueueError::InvalidTransition("Queue is full".into()))?;

        let query = format!(
            "INSERT INTO queue_entries \
                (ticket_id, counter_id, position_in_queue, status_id, user_id, \
                 customer_name, customer_phone, estimated_wait_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(Uuid::new_v4())
            .bind(chosen.counter_id)
            .bind(position)
            .bind(QueueStatus::Waiting.id())
            .bind(input.user_id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(estimate_wait_minutes(position, settings))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            entry_id = entry.id,
            counter_id = entry.counter_id,
            token = entry.token_number,
            position = entry.position_in_queue,
            "Queue entry created"
        );
        Ok(entry)
    }

    /// Remove a waiting or called entry on the customer's request and close
    /// the gap it leaves. Returns the removed row.
    pub async fn leave(
        pool: &PgPool,
        ticket_id: Uuid,
        settings: &QueueSettings,
    ) -> Result<QueueEntry, QueueError> {
        let existing = Self::find_by_ticket(pool, ticket_id)
            .await?
            .ok_or(QueueError::EntryNotFound)?;

        let mut tx = pool.begin().await?;
        Self::lock_counter(&mut tx, existing.counter_id).await?;

        let query = format!("SELECT {COLUMNS} FROM queue_entries WHERE ticket_id = $1 FOR UPDATE");
        let entry = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(QueueError::EntryNotFound)?;

        if !entry.status().is_active() {
            return Err(QueueError::InvalidTransition(
                "Served tickets cannot leave the queue".into(),
            ));
        }

        sqlx::query("DELETE FROM queue_entries WHERE id = $1")
            .bind(entry.id)
            .execute(&mut *tx)
            .await?;

        Self::reorder_positions(&mut tx, entry.counter_id, settings).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Call the head of the counter's waiting line.
    ///
    /// Fails with [`QueueError::AlreadyCalled`] while another customer is
    /// still being served. Returns `None` when nobody is waiting.
    pub async fn call_next(
        pool: &PgPool,
        counter_id: DbId,
        staff_id: DbId,
        settings: &QueueSettings,
    ) -> Result<Option<QueueEntry>, QueueError> {
        let mut tx = pool.begin().await?;
        Self::lock_counter(&mut tx, counter_id).await?;

        if Self::called_in_tx(&mut tx, counter_id).await?.is_some() {
            return Err(QueueError::AlreadyCalled(counter_id));
        }

        let Some(head) = Self::find_head(&mut tx, counter_id).await? else {
            tx.commit().await?;
            return Ok(None);
        };

        let query = format!(
            "UPDATE queue_entries SET \
                status_id = $2, \
                called_at = NOW(), \
                position_in_queue = $3, \
                estimated_wait_minutes = 0, \
                served_by = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let called = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(head.id)
            .bind(QueueStatus::Called.id())
            .bind(NOT_WAITING_POSITION)
            .bind(staff_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::reorder_positions(&mut tx, counter_id, settings).await?;
        tx.commit().await?;
        Ok(Some(called))
    }

    /// Serve the counter's called customer, or the head of the waiting line
    /// when nobody has been called. Returns `None` when there is nobody to serve.
    pub async fn serve_next(
        pool: &PgPool,
        counter_id: DbId,
        staff_id: DbId,
        settings: &QueueSettings,
    ) -> Result<Option<QueueEntry>, QueueError> {
        let mut tx = pool.begin().await?;
        Self::lock_counter(&mut tx, counter_id).await?;

        let target = match Self::called_in_tx(&mut tx, counter_id).await? {
            Some(called) => Some(called),
            None => Self::find_head(&mut tx, counter_id).await?,
        };

        let Some(target) = target else {
            tx.commit().await?;
            return Ok(None);
        };

        let served = Self::mark_served(&mut tx, target.id, staff_id).await?;
        Self::reorder_positions(&mut tx, counter_id, settings).await?;
        tx.commit().await?;
        Ok(Some(served))
    }

    /// Serve one specific waiting or called entry.
    pub async fn serve(
        pool: &PgPool,
        entry_id: DbId,
        staff_id: DbId,
        settings: &QueueSettings,
    ) -> Result<QueueEntry, QueueError> {
        let existing = Self::find_by_id(pool, entry_id)
            .await?
            .ok_or(QueueError::EntryNotFound)?;

        let mut tx = pool.begin().await?;
        Self::lock_counter(&mut tx, existing.counter_id).await?;

        let query = format!("SELECT {COLUMNS} FROM queue_entries WHERE id = $1 FOR UPDATE");
        let entry = sqlx::query_as::<_, QueueEntry>(&query)
            .bind(entry_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(QueueError::EntryNotFound)?;

        validate_transition(entry.status(), QueueStatus::Served)
            .map_err(QueueError::InvalidTransition)?;

        let served = Self::mark_served(&mut tx, entry.id, staff_id).await?;
        Self::reorder_positions(&mut tx, entry.counter_id, settings).await?;
        tx.commit().await?;
        Ok(served)
    }

    /// Renumber a counter's waiting set to `1..=n` in queue order and refresh
    /// each entry's wait estimate. Returns the number of rows changed.
    ///
    /// Runs on the caller's connection so it shares the caller's transaction.
    pub async fn reorder_positions(
        conn: &mut PgConnection,
        counter_id: DbId,
        settings: &QueueSettings,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_entries q SET \
                position_in_queue = r.new_position, \
                estimated_wait_minutes = r.new_position * $3 \
             FROM ( \
                 SELECT id, ROW_NUMBER() OVER (ORDER BY position_in_queue, token_number)::INTEGER \
                        AS new_position \
                 FROM queue_entries \
                 WHERE counter_id = $1 AND status_id = $2 \
             ) r \
             WHERE q.id = r.id AND q.position_in_queue <> r.new_position",
        )
        .bind(counter_id)
        .bind(QueueStatus::Waiting.id())
        .bind(settings.avg_service_minutes)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an entry by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queue_entries WHERE id = $1");
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an entry by the ticket UUID handed to the customer.
    pub async fn find_by_ticket(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queue_entries WHERE ticket_id = $1");
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    }

    /// Ticket joined with its counter's number and name.
    pub async fn find_ticket_view(
        pool: &PgPool,
        ticket_id: Uuid,
    ) -> Result<Option<TicketRow>, sqlx::Error> {
        sqlx::query_as::<_, TicketRow>(
            "SELECT q.id, q.ticket_id, q.token_number, q.position_in_queue, q.status_id, \
                    q.estimated_wait_minutes, q.counter_id, c.counter_number, \
                    c.name AS counter_name, q.joined_at, q.called_at, q.served_at \
             FROM queue_entries q \
             JOIN counters c ON c.id = q.counter_id \
             WHERE q.ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_optional(pool)
        .await
    }

    /// The counter's waiting line in order, with guest placeholders.
    pub async fn list_waiting(
        pool: &PgPool,
        counter_id: DbId,
    ) -> Result<Vec<WaitingEntryView>, sqlx::Error> {
        sqlx::query_as::<_, WaitingEntryView>(
            "SELECT q.id, q.token_number, q.position_in_queue, \
                    COALESCE(NULLIF(q.customer_name, ''), u.full_name, $3) AS customer_name, \
                    COALESCE(NULLIF(q.customer_phone, ''), u.phone_number, $4) AS customer_phone, \
                    q.user_id, q.estimated_wait_minutes, q.joined_at \
             FROM queue_entries q \
             LEFT JOIN users u ON u.id = q.user_id \
             WHERE q.counter_id = $1 AND q.status_id = $2 \
             ORDER BY q.position_in_queue, q.token_number",
        )
        .bind(counter_id)
        .bind(QueueStatus::Waiting.id())
        .bind(GUEST_NAME)
        .bind(GUEST_PHONE)
        .fetch_all(pool)
        .await
    }

    /// Waiting entries at positions `1..=limit`.
    pub async fn list_front(
        pool: &PgPool,
        counter_id: DbId,
        limit: i32,
    ) -> Result<Vec<QueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries \
             WHERE counter_id = $1 AND status_id = $2 \
               AND position_in_queue BETWEEN 1 AND $3 \
             ORDER BY position_in_queue"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(counter_id)
            .bind(QueueStatus::Waiting.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The entry currently called to a counter, if any.
    pub async fn find_called(
        pool: &PgPool,
        counter_id: DbId,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries WHERE counter_id = $1 AND status_id = $2"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(counter_id)
            .bind(QueueStatus::Called.id())
            .fetch_optional(pool)
            .await
    }

    /// The user's waiting or called entry, if any.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries \
             WHERE user_id = $1 AND status_id IN ($2, $3) \
             ORDER BY token_number DESC LIMIT 1"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(user_id)
            .bind(QueueStatus::Waiting.id())
            .bind(QueueStatus::Called.id())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock a counter row for the rest of the transaction.
    async fn lock_counter(conn: &mut PgConnection, counter_id: DbId) -> Result<(), QueueError> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM counters WHERE id = $1 FOR UPDATE")
                .bind(counter_id)
                .fetch_optional(conn)
                .await?;
        locked
            .map(|_| ())
            .ok_or(QueueError::CounterNotFound(counter_id))
    }

    async fn has_active_entry(conn: &mut PgConnection, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM queue_entries WHERE user_id = $1 AND status_id IN ($2, $3))",
        )
        .bind(user_id)
        .bind(QueueStatus::Waiting.id())
        .bind(QueueStatus::Called.id())
        .fetch_one(conn)
        .await
    }

    async fn called_in_tx(
        conn: &mut PgConnection,
        counter_id: DbId,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries WHERE counter_id = $1 AND status_id = $2"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(counter_id)
            .bind(QueueStatus::Called.id())
            .fetch_optional(conn)
            .await
    }

    async fn find_head(
        conn: &mut PgConnection,
        counter_id: DbId,
    ) -> Result<Option<QueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_entries \
             WHERE counter_id = $1 AND status_id = $2 \
             ORDER BY position_in_queue, token_number \
             LIMIT 1"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(counter_id)
            .bind(QueueStatus::Waiting.id())
            .fetch_optional(conn)
            .await
    }

    async fn mark_served(
        conn: &mut PgConnection,
        entry_id: DbId,
        staff_id: DbId,
    ) -> Result<QueueEntry, sqlx::Error> {
        let query = format!(
            "UPDATE queue_entries SET \
                status_id = $2, \
                called_at = COALESCE(called_at, NOW()), \
                served_at = NOW(), \
                position_in_queue = $3, \
                estimated_wait_minutes = 0, \
                served_by = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueEntry>(&query)
            .bind(entry_id)
            .bind(QueueStatus::Served.id())
            .bind(NOT_WAITING_POSITION)
            .bind(staff_id)
            .fetch_one(conn)
            .await
    }
}
