//! Route definitions for the `/staff` resource. Every route requires staff or admin.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::staff;
use crate::state::AppState;

/// Routes mounted at `/staff`.
///
/// ```text
/// GET  /counters/{id}/queue       -> counter_queue
/// POST /counters/{id}/claim       -> claim_counter
/// POST /counters/{id}/call-next   -> call_next
/// POST /counters/{id}/serve-next  -> serve_next
/// GET  /counters/{id}/feedback    -> counter_feedback
/// POST /entries/{id}/serve        -> serve_entry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/counters/{id}/queue", get(staff::counter_queue))
        .route("/counters/{id}/claim", post(staff::claim_counter))
        .route("/counters/{id}/call-next", post(staff::call_next))
        .route("/counters/{id}/serve-next", post(staff::serve_next))
        .route("/counters/{id}/feedback", get(staff::counter_feedback))
        .route("/entries/{id}/serve", post(staff::serve_entry))
}
