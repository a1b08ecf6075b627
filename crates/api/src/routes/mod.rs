pub mod admin;
pub mod auth;
pub mod health;
pub mod queue;
pub mod staff;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?ticket={uuid}|counter={id}                   WebSocket subscription
///
/// /auth/register, /login, /refresh                 public
/// /auth/logout, /me                                requires auth
///
/// /counters                                        active counters (public)
/// /queue/overview                                  display board (public)
/// /queue/join                                      join (optional auth)
/// /queue/tickets/{ticket_id}                       status, leave
/// /queue/tickets/{ticket_id}/feedback              rate a served ticket
///
/// /staff/counters/{id}/queue                       waiting list (staff)
/// /staff/counters/{id}/claim                       operate counter
/// /staff/counters/{id}/call-next                   call next customer
/// /staff/counters/{id}/serve-next                  serve next customer
/// /staff/counters/{id}/feedback                    recent feedback
/// /staff/entries/{id}/serve                        serve a specific entry
///
/// /admin/counters, /admin/counters/{id}            counter CRUD (admin)
/// /admin/staff, /admin/staff/{id}                  staff accounts
/// /admin/stats, /admin/feedback, /admin/events     reporting
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .route("/counters", get(handlers::counters::list_active))
        .nest("/queue", queue::router())
        .nest("/staff", staff::router())
        .nest("/admin", admin::router())
}
