//! Errors raised by the transactional queue operations.

use queuedesk_core::types::DbId;

/// Failure of a queue mutation (join, leave, call, serve, counter removal).
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("No active counters available")]
    NoActiveCounters,

    #[error("Queue entry not found")]
    EntryNotFound,

    #[error("Counter with id {0} not found")]
    CounterNotFound(DbId),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Counter {0} is already serving a customer")]
    AlreadyCalled(DbId),

    #[error("Counter {0} still has customers in its queue")]
    CounterBusy(DbId),

    #[error("Counter {0} has queue history; deactivate it instead")]
    CounterHasHistory(DbId),

    #[error("An active ticket already exists for this account")]
    ActiveTicketExists,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
