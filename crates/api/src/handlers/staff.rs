//! Counter operation handlers for staff: waiting list, claim, call, serve, feedback.
//!
//! All handlers require `staff` or `admin` via [`RequireStaff`].

use axum::extract::{Path, Query, State};
use axum::Json;
use queuedesk_core::error::CoreError;
use queuedesk_core::paging::clamp_limit;
use queuedesk_core::queue_events::{EVENT_COUNTER_UPDATED, EVENT_QUEUE_CALLED, EVENT_QUEUE_SERVED};
use queuedesk_core::types::DbId;
use queuedesk_db::models::counter::Counter;
use queuedesk_db::models::feedback::Feedback;
use queuedesk_db::models::queue_entry::{QueueEntry, WaitingEntryView};
use queuedesk_db::repositories::feedback_repo::DEFAULT_COUNTER_FEEDBACK_LIMIT;
use queuedesk_db::repositories::{CounterRepo, FeedbackRepo, QueueEntryRepo};
use queuedesk_events::QueueEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::handlers::queue::entry_event;
use crate::middleware::rbac::RequireStaff;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound for `?limit=` on a counter's feedback.
const MAX_COUNTER_FEEDBACK_LIMIT: i64 = 100;

/// A counter's live queue as shown on the staff dashboard.
#[derive(Debug, Serialize)]
pub struct CounterQueueResponse {
    pub counter: Counter,
    /// Customer currently called to the counter.
    pub current: Option<QueueEntry>,
    pub waiting: Vec<WaitingEntryView>,
}

/// GET /api/v1/staff/counters/{id}/queue
pub async fn counter_queue(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(counter_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CounterQueueResponse>>> {
    let counter = find_counter(&state, counter_id).await?;
    let current = QueueEntryRepo::find_called(&state.pool, counter_id).await?;
    let waiting = QueueEntryRepo::list_waiting(&state.pool, counter_id).await?;

    Ok(Json(DataResponse {
        data: CounterQueueResponse {
            counter,
            current,
            waiting,
        },
    }))
}

/// POST /api/v1/staff/counters/{id}/claim
///
/// Record the caller as the operator of the counter.
pub async fn claim_counter(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(counter_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Counter>>> {
    let counter = CounterRepo::assign_staff(&state.pool, counter_id, staff.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Counter",
            id: counter_id,
        })?;

    tracing::info!(counter_id, staff_id = staff.user_id, "Counter claimed");
    state.event_bus.publish(
        QueueEvent::new(EVENT_COUNTER_UPDATED)
            .with_counter(counter_id)
            .with_actor(staff.user_id)
            .with_payload(json!({ "current_staff_id": staff.user_id })),
    );

    Ok(Json(DataResponse { data: counter }))
}

/// POST /api/v1/staff/counters/{id}/call-next
///
/// Call the head of the line. `data` is `null` when nobody is waiting;
/// 409 while another customer is still called.
pub async fn call_next(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(counter_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<QueueEntry>>>> {
    let called =
        QueueEntryRepo::call_next(&state.pool, counter_id, staff.user_id, &state.config.queue)
            .await?;

    match &called {
        Some(entry) => {
            tracing::info!(counter_id, token = entry.token_number, "Customer called");
            state
                .event_bus
                .publish(entry_event(EVENT_QUEUE_CALLED, entry, Some(staff.user_id)));
        }
        None => tracing::debug!(counter_id, "Call next: nobody waiting"),
    }

    Ok(Json(DataResponse { data: called }))
}

/// POST /api/v1/staff/counters/{id}/serve-next
///
/// Serve the called customer, or the head of the line when nobody is called.
/// `data` is `null` when there is nobody to serve.
pub async fn serve_next(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(counter_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<QueueEntry>>>> {
    let served =
        QueueEntryRepo::serve_next(&state.pool, counter_id, staff.user_id, &state.config.queue)
            .await?;

    if let Some(entry) = &served {
        tracing::info!(counter_id, token = entry.token_number, "Customer served");
        state
            .event_bus
            .publish(entry_event(EVENT_QUEUE_SERVED, entry, Some(staff.user_id)));
    }

    Ok(Json(DataResponse { data: served }))
}

/// POST /api/v1/staff/entries/{id}/serve
pub async fn serve_entry(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(entry_id): Path<DbId>,
) -> AppResult<Json<DataResponse<QueueEntry>>> {
    let served =
        QueueEntryRepo::serve(&state.pool, entry_id, staff.user_id, &state.config.queue).await?;

    tracing::info!(
        counter_id = served.counter_id,
        token = served.token_number,
        "Customer served"
    );
    state
        .event_bus
        .publish(entry_event(EVENT_QUEUE_SERVED, &served, Some(staff.user_id)));

    Ok(Json(DataResponse { data: served }))
}

/// GET /api/v1/staff/counters/{id}/feedback
pub async fn counter_feedback(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(counter_id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Feedback>>>> {
    find_counter(&state, counter_id).await?;
    let limit = clamp_limit(
        params.limit,
        DEFAULT_COUNTER_FEEDBACK_LIMIT,
        MAX_COUNTER_FEEDBACK_LIMIT,
    );
    let rows = FeedbackRepo::list_for_counter(&state.pool, counter_id, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}

async fn find_counter(state: &AppState, counter_id: DbId) -> AppResult<Counter> {
    CounterRepo::find_by_id(&state.pool, counter_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Counter",
                id: counter_id,
            }
            .into()
        })
}
