//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.
//! Handlers publish after their transaction commits; the persistence and
//! notification services each hold their own receiver.

use chrono::{DateTime, Utc};
use queuedesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// QueueEvent
// ---------------------------------------------------------------------------

/// Something that changed a counter or a queue entry.
///
/// Constructed via [`QueueEvent::new`] and enriched with the builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEvent {
    /// Dot-separated event name, e.g. `"queue.joined"`.
    pub event_type: String,

    /// Counter whose queue or settings changed.
    pub counter_id: Option<DbId>,

    /// Queue entry the event is about.
    pub queue_entry_id: Option<DbId>,

    /// Public ticket id of that entry, used to route ticket notifications.
    pub ticket_id: Option<Uuid>,

    /// User that triggered the event, if authenticated.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl QueueEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            counter_id: None,
            queue_entry_id: None,
            ticket_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_counter(mut self, counter_id: DbId) -> Self {
        self.counter_id = Some(counter_id);
        self
    }

    /// Attach a queue entry and its public ticket id.
    pub fn with_entry(mut self, entry_id: DbId, ticket_id: Uuid) -> Self {
        self.queue_entry_id = Some(entry_id);
        self.ticket_id = Some(ticket_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Attach the acting user when there is one (anonymous customers have none).
    pub fn with_optional_actor(mut self, user_id: Option<DbId>) -> Self {
        self.actor_user_id = user_id;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use queuedesk_events::bus::{EventBus, QueueEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(QueueEvent::new("queue.joined").with_counter(1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: QueueEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let ticket = Uuid::new_v4();

        bus.publish(
            QueueEvent::new("queue.joined")
                .with_counter(3)
                .with_entry(42, ticket)
                .with_actor(7)
                .with_payload(serde_json::json!({"token_number": 101})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "queue.joined");
        assert_eq!(received.counter_id, Some(3));
        assert_eq!(received.queue_entry_id, Some(42));
        assert_eq!(received.ticket_id, Some(ticket));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["token_number"], 101);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(QueueEvent::new("counter.updated"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "counter.updated");
        assert_eq!(rx2.recv().await.unwrap().event_type, "counter.updated");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(QueueEvent::new("queue.left"));
    }

    #[test]
    fn anonymous_actor_stays_empty() {
        let event = QueueEvent::new("queue.joined").with_optional_actor(None);
        assert!(event.actor_user_id.is_none());
        assert!(event.counter_id.is_none());
        assert!(event.ticket_id.is_none());
        assert!(event.payload.is_object());
    }

    #[tokio::test]
    async fn dropping_bus_closes_receivers() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        drop(bus);
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
