//! Route definitions for the customer-facing `/queue` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::queue;
use crate::state::AppState;

/// Routes mounted at `/queue`.
///
/// ```text
/// GET    /overview                      -> overview
/// POST   /join                          -> join
/// GET    /tickets/mine                  -> my_ticket
/// GET    /tickets/{ticket_id}           -> get_ticket
/// DELETE /tickets/{ticket_id}           -> leave
/// POST   /tickets/{ticket_id}/feedback  -> submit_feedback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(queue::overview))
        .route("/join", post(queue::join))
        .route("/tickets/mine", get(queue::my_ticket))
        .route(
            "/tickets/{ticket_id}",
            get(queue::get_ticket).delete(queue::leave),
        )
        .route("/tickets/{ticket_id}/feedback", post(queue::submit_feedback))
}
