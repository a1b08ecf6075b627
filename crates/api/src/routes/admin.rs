//! Route definitions for the `/admin` resource. Every route requires admin.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::{admin, counters};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET, POST   /counters        -> list_all, create
/// PUT, DELETE /counters/{id}   -> update, delete
/// GET, POST   /staff           -> list_staff, create_staff
/// DELETE      /staff/{id}      -> deactivate_staff
/// GET         /stats           -> stats
/// GET         /feedback        -> list_feedback
/// GET         /events          -> list_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/counters", get(counters::list_all).post(counters::create))
        .route(
            "/counters/{id}",
            put(counters::update).delete(counters::delete),
        )
        .route("/staff", get(admin::list_staff).post(admin::create_staff))
        .route("/staff/{id}", delete(admin::deactivate_staff))
        .route("/stats", get(admin::stats))
        .route("/feedback", get(admin::list_feedback))
        .route("/events", get(admin::list_events))
}
