use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use queuedesk_core::types::DbId;
use queuedesk_db::repositories::{CounterRepo, QueueEntryRepo};
use queuedesk_db::QueueError;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::ws::manager::{Topic, WsManager};

/// `?ticket={uuid}` for a customer, `?counter={id}` for a board or staff.
#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    pub ticket: Option<Uuid>,
    pub counter: Option<DbId>,
}

/// GET /api/v1/ws
///
/// Resolves the requested topics before upgrading, so an unknown ticket or
/// counter is rejected with a normal HTTP error. A ticket subscription also
/// receives its counter's updates.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<SubscribeParams>,
) -> AppResult<impl IntoResponse> {
    let topics = resolve_topics(&state, &params).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, topics)))
}

async fn resolve_topics(state: &AppState, params: &SubscribeParams) -> AppResult<Vec<Topic>> {
    let mut topics = Vec::new();

    if let Some(ticket_id) = params.ticket {
        let entry = QueueEntryRepo::find_by_ticket(&state.pool, ticket_id)
            .await?
            .ok_or(QueueError::EntryNotFound)?;
        topics.push(Topic::Ticket(ticket_id));
        topics.push(Topic::Counter(entry.counter_id));
    }

    if let Some(counter_id) = params.counter {
        CounterRepo::find_by_id(&state.pool, counter_id)
            .await?
            .ok_or(QueueError::CounterNotFound(counter_id))?;
        let topic = Topic::Counter(counter_id);
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }

    if topics.is_empty() {
        return Err(AppError::BadRequest(
            "Subscribe with ?ticket={ticket_id} or ?counter={counter_id}".into(),
        ));
    }
    Ok(topics)
}

/// Manage a single WebSocket connection after upgrade.
///
/// The connection only receives; inbound frames other than Close are ignored.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, topics: Vec<Topic>) {
    let conn_id = Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, ?topics, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), topics).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
