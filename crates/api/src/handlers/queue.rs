//! Customer-facing queue handlers: join, overview, ticket status, leave, feedback.
//!
//! A ticket is addressed by its random `ticket_id`; holding the id is what
//! lets a guest view, leave or rate it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use queuedesk_core::error::CoreError;
use queuedesk_core::queue::{
    estimate_wait_minutes, is_almost_turn, people_ahead, QueueSettings, QueueStatus,
};
use queuedesk_core::queue_events::{EVENT_QUEUE_JOINED, EVENT_QUEUE_LEFT};
use queuedesk_core::types::{DbId, Timestamp};
use queuedesk_core::validation::{validate_comments, validate_customer_details, validate_rating};
use queuedesk_db::models::counter::CounterOverview;
use queuedesk_db::models::feedback::{CreateFeedback, Feedback};
use queuedesk_db::models::queue_entry::{JoinQueue, QueueEntry, TicketRow};
use queuedesk_db::repositories::{CounterRepo, FeedbackRepo, QueueEntryRepo, UserRepo};
use queuedesk_db::QueueError;
use queuedesk_events::QueueEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OptionalAuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /queue/join`.
///
/// Signed-in customers may omit both fields; their profile fills them in.
#[derive(Debug, Default, Deserialize)]
pub struct JoinQueueRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

/// Request body for `POST /queue/tickets/{ticket_id}/feedback`.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i16,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketCounter {
    pub id: DbId,
    pub counter_number: i32,
    pub name: String,
}

/// Everything the ticket holder sees about their place in line.
#[derive(Debug, Clone, Serialize)]
pub struct TicketResponse {
    pub ticket_id: Uuid,
    pub token_number: i64,
    pub status: QueueStatus,
    /// 1-based while waiting, 0 once called or served.
    pub position_in_queue: i32,
    pub people_ahead: i32,
    pub estimated_wait_minutes: i32,
    pub almost_your_turn: bool,
    pub counter: TicketCounter,
    pub joined_at: Timestamp,
    pub called_at: Option<Timestamp>,
    pub served_at: Option<Timestamp>,
}

impl TicketResponse {
    pub fn from_row(row: &TicketRow, settings: &QueueSettings) -> Self {
        let status = row.status();
        let waiting = status == QueueStatus::Waiting;
        Self {
            ticket_id: row.ticket_id,
            token_number: row.token_number,
            status,
            position_in_queue: row.position_in_queue,
            people_ahead: if waiting { people_ahead(row.position_in_queue) } else { 0 },
            estimated_wait_minutes: if waiting {
                estimate_wait_minutes(row.position_in_queue, settings)
            } else {
                0
            },
            almost_your_turn: is_almost_turn(status, row.position_in_queue, settings),
            counter: TicketCounter {
                id: row.counter_id,
                counter_number: row.counter_number,
                name: row.counter_name.clone(),
            },
            joined_at: row.joined_at,
            called_at: row.called_at,
            served_at: row.served_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/queue/join
///
/// Place the caller in the shortest waiting line. Returns 201 with the ticket.
pub async fn join(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Json(input): Json<JoinQueueRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketResponse>>)> {
    let mut name = input.customer_name.unwrap_or_default();
    let mut phone = input.customer_phone.unwrap_or_default();

    let user_id = auth.as_ref().map(|a| a.user_id);
    if let Some(user_id) = user_id {
        if let Some(user) = UserRepo::find_by_id(&state.pool, user_id).await? {
            if name.trim().is_empty() {
                name = user.full_name;
            }
            if phone.trim().is_empty() {
                phone = user.phone_number;
            }
        }
    }
    validate_customer_details(&name, &phone)?;

    let entry = QueueEntryRepo::join(
        &state.pool,
        &JoinQueue {
            user_id,
            customer_name: name.trim().to_string(),
            customer_phone: phone.trim().to_string(),
        },
        &state.config.queue,
    )
    .await?;

    tracing::info!(
        counter_id = entry.counter_id,
        token = entry.token_number,
        position = entry.position_in_queue,
        "Customer joined queue"
    );
    state
        .event_bus
        .publish(entry_event(EVENT_QUEUE_JOINED, &entry, user_id));

    let ticket = load_ticket(&state, entry.ticket_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/queue/overview
///
/// Display board: waiting count and current token for every active counter.
pub async fn overview(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CounterOverview>>>> {
    let rows = CounterRepo::overview(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/queue/tickets/{ticket_id}
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let ticket = load_ticket(&state, ticket_id).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// GET /api/v1/queue/tickets/mine
///
/// The caller's waiting or called ticket. Lets a signed-in customer who lost
/// the ticket id find it again; 404 when they hold none.
pub async fn my_ticket(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let entry = QueueEntryRepo::find_active_for_user(&state.pool, auth.user_id)
        .await?
        .ok_or(QueueError::EntryNotFound)?;
    let ticket = load_ticket(&state, entry.ticket_id).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/queue/tickets/{ticket_id}
///
/// Leave the queue. Everyone behind moves up one place. Returns 204.
pub async fn leave(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let entry = QueueEntryRepo::leave(&state.pool, ticket_id, &state.config.queue).await?;

    tracing::info!(
        counter_id = entry.counter_id,
        token = entry.token_number,
        "Customer left queue"
    );
    state.event_bus.publish(entry_event(
        EVENT_QUEUE_LEFT,
        &entry,
        auth.map(|a| a.user_id),
    ));

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/queue/tickets/{ticket_id}/feedback
///
/// Rate a served ticket, once. Returns 201 with the stored feedback.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<FeedbackRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Feedback>>)> {
    validate_rating(input.rating)?;
    let comments = input
        .comments
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    validate_comments(comments.as_deref())?;

    let entry = QueueEntryRepo::find_by_ticket(&state.pool, ticket_id)
        .await?
        .ok_or(QueueError::EntryNotFound)?;

    if entry.status() != QueueStatus::Served {
        return Err(AppError::Core(CoreError::Conflict(
            "Feedback can only be given after the ticket has been served".into(),
        )));
    }
    if FeedbackRepo::find_by_entry(&state.pool, entry.id).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Feedback has already been submitted for this ticket".into(),
        )));
    }

    // A concurrent submission still trips `uq_feedback_queue_entry_id`.
    let feedback = FeedbackRepo::create(
        &state.pool,
        &CreateFeedback {
            queue_entry_id: entry.id,
            counter_id: Some(entry.counter_id),
            rating: input.rating,
            comments,
            customer_name: entry.customer_name.clone(),
            customer_phone: entry.customer_phone.clone(),
        },
    )
    .await?;

    tracing::info!(
        counter_id = entry.counter_id,
        rating = feedback.rating,
        "Feedback recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: feedback })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_ticket(state: &AppState, ticket_id: Uuid) -> AppResult<TicketResponse> {
    let row = QueueEntryRepo::find_ticket_view(&state.pool, ticket_id)
        .await?
        .ok_or(QueueError::EntryNotFound)?;
    Ok(TicketResponse::from_row(&row, &state.config.queue))
}

/// Build the bus event for a change to one queue entry.
pub(crate) fn entry_event(event_type: &str, entry: &QueueEntry, actor: Option<DbId>) -> QueueEvent {
    QueueEvent::new(event_type)
        .with_counter(entry.counter_id)
        .with_entry(entry.id, entry.ticket_id)
        .with_optional_actor(actor)
        .with_payload(json!({
            "token_number": entry.token_number,
            "status": entry.status(),
            "position_in_queue": entry.position_in_queue,
        }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(status: QueueStatus, position: i32) -> TicketRow {
        TicketRow {
            id: 1,
            ticket_id: Uuid::new_v4(),
            token_number: 17,
            position_in_queue: position,
            status_id: status.id(),
            estimated_wait_minutes: Some(position * 2),
            counter_id: 3,
            counter_number: 2,
            counter_name: "Counter 2".to_string(),
            joined_at: Utc::now(),
            called_at: None,
            served_at: None,
        }
    }

    #[test]
    fn waiting_ticket_reports_people_ahead_and_wait() {
        let ticket = TicketResponse::from_row(&row(QueueStatus::Waiting, 5), &QueueSettings::default());
        assert_eq!(ticket.people_ahead, 4);
        assert_eq!(ticket.estimated_wait_minutes, 10);
        assert!(!ticket.almost_your_turn);
        assert_eq!(ticket.counter.counter_number, 2);
    }

    #[test]
    fn front_of_line_is_almost_turn() {
        let ticket = TicketResponse::from_row(&row(QueueStatus::Waiting, 2), &QueueSettings::default());
        assert!(ticket.almost_your_turn);
    }

    #[test]
    fn called_ticket_has_no_wait() {
        let ticket = TicketResponse::from_row(&row(QueueStatus::Called, 0), &QueueSettings::default());
        assert_eq!(ticket.people_ahead, 0);
        assert_eq!(ticket.estimated_wait_minutes, 0);
        assert!(!ticket.almost_your_turn);
    }

    #[test]
    fn entry_event_carries_ticket_and_counter() {
        let now = Utc::now();
        let entry = QueueEntry {
            id: 9,
            ticket_id: Uuid::new_v4(),
            counter_id: 4,
            token_number: 33,
            position_in_queue: 2,
            status_id: QueueStatus::Waiting.id(),
            user_id: None,
            customer_name: Some("Lee".into()),
            customer_phone: Some("555".into()),
            estimated_wait_minutes: Some(4),
            served_by: None,
            joined_at: now,
            called_at: None,
            served_at: None,
            created_at: now,
            updated_at: now,
        };
        let event = entry_event(EVENT_QUEUE_JOINED, &entry, None);
        assert_eq!(event.counter_id, Some(4));
        assert_eq!(event.queue_entry_id, Some(9));
        assert_eq!(event.ticket_id, Some(entry.ticket_id));
        assert_eq!(event.payload["token_number"], 33);
        assert_eq!(event.payload["status"], "waiting");
    }
}
