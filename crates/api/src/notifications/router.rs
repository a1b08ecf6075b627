//! Event-to-WebSocket routing.
//!
//! Every queue event is turned into up to three kinds of message:
//!
//! - `counter_update` to the event's counter topic, carrying the fresh
//!   display-board row for that counter;
//! - `ticket_update` to the event's ticket topic, carrying the ticket as
//!   its holder sees it (or `{"status": "left"}` once it is gone);
//! - `almost_your_turn` to each waiting ticket within `notify_ahead`
//!   positions of the front, after a change that moved the line.

use std::sync::Arc;

use axum::extract::ws::Message;
use queuedesk_core::queue::{
    estimate_wait_minutes, is_almost_turn, people_ahead, QueueSettings, QueueStatus,
};
use queuedesk_core::queue_events::{
    reorders_positions, EVENT_QUEUE_JOINED, MSG_TYPE_ALMOST_YOUR_TURN, MSG_TYPE_COUNTER_UPDATE,
    MSG_TYPE_TICKET_UPDATE,
};
use queuedesk_core::types::DbId;
use queuedesk_db::models::counter::CounterOverview;
use queuedesk_db::models::queue_entry::QueueEntry;
use queuedesk_db::repositories::{CounterRepo, QueueEntryRepo};
use queuedesk_db::DbPool;
use queuedesk_events::QueueEvent;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::handlers::queue::TicketResponse;
use crate::ws::{Topic, WsManager};

type RouteResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Pushes queue changes to WebSocket subscribers.
pub struct QueueNotifier {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    settings: QueueSettings,
}

impl QueueNotifier {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>, settings: QueueSettings) -> Self {
        Self {
            pool,
            ws_manager,
            settings,
        }
    }

    /// Run the routing loop until the [`EventBus`](queuedesk_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<QueueEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Queue notifier lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, queue notifier shutting down");
                    break;
                }
            }
        }
    }

    /// Each push is independent: one failing does not hold back the others.
    async fn route_event(&self, event: &QueueEvent) {
        let Some(counter_id) = event.counter_id else {
            return;
        };

        report(
            event,
            MSG_TYPE_COUNTER_UPDATE,
            self.push_counter_update(counter_id, event).await,
        );

        if let Some(ticket_id) = event.ticket_id {
            report(
                event,
                MSG_TYPE_TICKET_UPDATE,
                self.push_ticket_update(ticket_id, event).await,
            );
        }

        if reorders_positions(&event.event_type) {
            report(
                event,
                MSG_TYPE_ALMOST_YOUR_TURN,
                self.push_front_of_line(counter_id).await,
            );
        } else if event.event_type == EVENT_QUEUE_JOINED {
            if let Some(ticket_id) = event.ticket_id {
                report(
                    event,
                    MSG_TYPE_ALMOST_YOUR_TURN,
                    self.push_if_almost_turn(ticket_id).await,
                );
            }
        }
    }

    async fn push_counter_update(&self, counter_id: DbId, event: &QueueEvent) -> RouteResult {
        let overview = CounterRepo::overview_for(&self.pool, counter_id).await?;
        let message = counter_update_message(&event.event_type, counter_id, overview.as_ref());
        self.send(Topic::Counter(counter_id), message).await;
        Ok(())
    }

    async fn push_ticket_update(&self, ticket_id: Uuid, event: &QueueEvent) -> RouteResult {
        let ticket = QueueEntryRepo::find_ticket_view(&self.pool, ticket_id)
            .await?
            .map(|row| TicketResponse::from_row(&row, &self.settings));
        let message = ticket_update_message(&event.event_type, ticket_id, ticket.as_ref());
        self.send(Topic::Ticket(ticket_id), message).await;
        Ok(())
    }

    /// Notify every waiting ticket now within reach of the counter.
    async fn push_front_of_line(&self, counter_id: DbId) -> RouteResult {
        let front =
            QueueEntryRepo::list_front(&self.pool, counter_id, self.settings.notify_ahead).await?;
        for entry in &front {
            let message = almost_your_turn_message(entry, &self.settings);
            self.send(Topic::Ticket(entry.ticket_id), message).await;
        }
        Ok(())
    }

    /// A customer who joins a short line is already near the front.
    async fn push_if_almost_turn(&self, ticket_id: Uuid) -> RouteResult {
        let Some(entry) = QueueEntryRepo::find_by_ticket(&self.pool, ticket_id).await? else {
            return Ok(());
        };
        if is_almost_turn(entry.status(), entry.position_in_queue, &self.settings) {
            let message = almost_your_turn_message(&entry, &self.settings);
            self.send(Topic::Ticket(ticket_id), message).await;
        }
        Ok(())
    }

    async fn send(&self, topic: Topic, message: Value) {
        let delivered = self
            .ws_manager
            .send_to_topic(&topic, Message::Text(message.to_string().into()))
            .await;
        tracing::trace!(?topic, delivered, "Queue notification sent");
    }
}

fn report(event: &QueueEvent, message_type: &str, result: RouteResult) {
    if let Err(e) = result {
        tracing::error!(
            error = %e,
            event_type = %event.event_type,
            message_type,
            "Failed to push queue notification"
        );
    }
}

// ---------------------------------------------------------------------------
// Message shapes
// ---------------------------------------------------------------------------

/// `data` is `null` when the counter is no longer active.
pub fn counter_update_message(
    event_type: &str,
    counter_id: DbId,
    overview: Option<&CounterOverview>,
) -> Value {
    json!({
        "type": MSG_TYPE_COUNTER_UPDATE,
        "event": event_type,
        "counter_id": counter_id,
        "data": overview,
    })
}

/// A ticket that no longer exists has left the queue.
pub fn ticket_update_message(
    event_type: &str,
    ticket_id: Uuid,
    ticket: Option<&TicketResponse>,
) -> Value {
    let data = match ticket {
        Some(ticket) => json!(ticket),
        None => json!({ "status": "left" }),
    };
    json!({
        "type": MSG_TYPE_TICKET_UPDATE,
        "event": event_type,
        "ticket_id": ticket_id,
        "data": data,
    })
}

pub fn almost_your_turn_message(entry: &QueueEntry, settings: &QueueSettings) -> Value {
    let position = entry.position_in_queue;
    json!({
        "type": MSG_TYPE_ALMOST_YOUR_TURN,
        "ticket_id": entry.ticket_id,
        "token_number": entry.token_number,
        "position_in_queue": position,
        "people_ahead": people_ahead(position),
        "estimated_wait_minutes": estimate_wait_minutes(position, settings),
        "status": QueueStatus::Waiting,
    })
}
