//! Durable event persistence service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every [`QueueEvent`] to the `queue_events` table. It runs as a
//! long-lived background task and stops once the bus is dropped.

use queuedesk_core::types::DbId;
use queuedesk_db::repositories::QueueEventRepo;
use queuedesk_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::QueueEvent;

pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<QueueEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write one event. The ticket id travels inside the payload.
    async fn persist(pool: &DbPool, event: &QueueEvent) -> Result<DbId, sqlx::Error> {
        let mut payload = event.payload.clone();
        if let (Some(ticket_id), Some(map)) = (event.ticket_id, payload.as_object_mut()) {
            map.entry("ticket_id")
                .or_insert_with(|| serde_json::Value::String(ticket_id.to_string()));
        }

        QueueEventRepo::insert(
            pool,
            &event.event_type,
            event.counter_id,
            event.queue_entry_id,
            event.actor_user_id,
            &payload,
        )
        .await
    }
}
