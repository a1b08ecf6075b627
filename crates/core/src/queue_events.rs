//! Event type names published on the event bus and WebSocket message types.
//!
//! Event names are persisted verbatim in `queue_events.event_type`.

/// A customer joined a counter's waiting line.
pub const EVENT_QUEUE_JOINED: &str = "queue.joined";

/// A customer left the queue before being served.
pub const EVENT_QUEUE_LEFT: &str = "queue.left";

/// Staff called the next customer to a counter.
pub const EVENT_QUEUE_CALLED: &str = "queue.called";

/// A customer was served.
pub const EVENT_QUEUE_SERVED: &str = "queue.served";

pub const EVENT_COUNTER_CREATED: &str = "counter.created";
pub const EVENT_COUNTER_UPDATED: &str = "counter.updated";
pub const EVENT_COUNTER_DELETED: &str = "counter.deleted";

pub const EVENT_STAFF_CREATED: &str = "staff.created";

/// Whether the event changes waiting positions at its counter.
pub fn reorders_positions(event_type: &str) -> bool {
    matches!(
        event_type,
        EVENT_QUEUE_LEFT | EVENT_QUEUE_CALLED | EVENT_QUEUE_SERVED
    )
}

/// WebSocket message: something changed at a subscribed counter.
pub const MSG_TYPE_COUNTER_UPDATE: &str = "counter_update";

/// WebSocket message: the subscribed ticket itself changed.
pub const MSG_TYPE_TICKET_UPDATE: &str = "ticket_update";

/// WebSocket message: the subscribed ticket is near the front of the line.
pub const MSG_TYPE_ALMOST_YOUR_TURN: &str = "almost_your_turn";
