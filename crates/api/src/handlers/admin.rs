//! Handlers for the `/admin` resource: staff accounts, statistics, feedback
//! and the event log.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use queuedesk_core::error::CoreError;
use queuedesk_core::paging::{clamp_limit, clamp_offset};
use queuedesk_core::queue_events::EVENT_STAFF_CREATED;
use queuedesk_core::roles::ROLE_STAFF;
use queuedesk_core::types::DbId;
use queuedesk_db::models::feedback::FeedbackWithCounter;
use queuedesk_db::models::queue_event::QueueEventRow;
use queuedesk_db::models::stats::{CounterStats, QueueTotals};
use queuedesk_db::models::user::UserResponse;
use queuedesk_db::repositories::feedback_repo::DEFAULT_RECENT_FEEDBACK_LIMIT;
use queuedesk_db::repositories::queue_event_repo::DEFAULT_EVENT_LIMIT;
use queuedesk_db::repositories::{
    FeedbackRepo, QueueEventRepo, SessionRepo, StatsRepo, UserRepo,
};
use queuedesk_events::QueueEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::handlers::auth::NewAccountRequest;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{LimitParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_FEEDBACK_LIMIT: i64 = 200;
const MAX_EVENT_LIMIT: i64 = 500;

/// Dashboard statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub totals: QueueTotals,
    pub counters: Vec<CounterStats>,
}

// ---------------------------------------------------------------------------
// Staff accounts
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/staff
pub async fn list_staff(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_by_role(&state.pool, ROLE_STAFF).await?;
    let data = users
        .iter()
        .map(|u| UserResponse::from_user(u, ROLE_STAFF))
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/staff
///
/// Create a staff account. Every field is required and the password needs at
/// least 6 characters (400). The account and its role are written in one
/// transaction; a taken email is a 409. Returns 201 with the new user.
pub async fn create_staff(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<NewAccountRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let create = input.into_create_user()?;
    let user = UserRepo::create_with_role(&state.pool, &create, ROLE_STAFF).await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "Staff account created");
    state.event_bus.publish(
        QueueEvent::new(EVENT_STAFF_CREATED)
            .with_actor(admin.user_id)
            .with_payload(json!({ "user_id": user.id, "email": user.email })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(&user, ROLE_STAFF),
        }),
    ))
}

/// DELETE /api/v1/admin/staff/{id}
///
/// Deactivate a staff account and revoke its sessions. Returns 204.
pub async fn deactivate_staff(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;

    // Only staff accounts are managed here.
    if UserRepo::role_name(&state.pool, user.role_id).await? != ROLE_STAFF {
        return Err(CoreError::NotFound {
            entity: "Staff member",
            id,
        }
        .into());
    }

    UserRepo::deactivate(&state.pool, id).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(
        user_id = id,
        revoked_sessions = revoked.len(),
        "Staff account deactivated"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<StatsResponse>>> {
    let totals = StatsRepo::totals(&state.pool).await?;
    let counters = StatsRepo::per_counter(&state.pool).await?;
    Ok(Json(DataResponse {
        data: StatsResponse { totals, counters },
    }))
}

/// GET /api/v1/admin/feedback?limit=&offset=
pub async fn list_feedback(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<FeedbackWithCounter>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_RECENT_FEEDBACK_LIMIT, MAX_FEEDBACK_LIMIT);
    let offset = clamp_offset(params.offset);
    let rows = FeedbackRepo::list_recent(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/admin/events?limit=
pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<QueueEventRow>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_EVENT_LIMIT, MAX_EVENT_LIMIT);
    let rows = QueueEventRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: rows }))
}
