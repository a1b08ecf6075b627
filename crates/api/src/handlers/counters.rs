//! Counter listing (public) and counter administration (admin).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use queuedesk_core::error::CoreError;
use queuedesk_core::queue_events::{
    EVENT_COUNTER_CREATED, EVENT_COUNTER_DELETED, EVENT_COUNTER_UPDATED,
};
use queuedesk_core::types::DbId;
use queuedesk_core::validation::{validate_counter_name, validate_counter_number};
use queuedesk_db::models::counter::{Counter, CreateCounter, UpdateCounter};
use queuedesk_db::repositories::CounterRepo;
use queuedesk_events::QueueEvent;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/counters
///
/// Active counters, ordered by number.
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Counter>>>> {
    let counters = CounterRepo::list(&state.pool, false).await?;
    Ok(Json(DataResponse { data: counters }))
}

/// GET /api/v1/admin/counters
///
/// Every counter, including inactive ones.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Counter>>>> {
    let counters = CounterRepo::list(&state.pool, true).await?;
    Ok(Json(DataResponse { data: counters }))
}

/// POST /api/v1/admin/counters
///
/// Returns 201; a taken counter number is a 409.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCounter>,
) -> AppResult<(StatusCode, Json<DataResponse<Counter>>)> {
    validate_counter_number(input.counter_number)?;
    validate_counter_name(&input.name)?;

    let counter = CounterRepo::create(&state.pool, &input).await?;

    tracing::info!(
        counter_id = counter.id,
        counter_number = counter.counter_number,
        "Counter created"
    );
    state.event_bus.publish(
        QueueEvent::new(EVENT_COUNTER_CREATED)
            .with_counter(counter.id)
            .with_actor(admin.user_id)
            .with_payload(json!({
                "counter_number": counter.counter_number,
                "name": counter.name,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: counter })))
}

/// PUT /api/v1/admin/counters/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCounter>,
) -> AppResult<Json<DataResponse<Counter>>> {
    if let Some(number) = input.counter_number {
        validate_counter_number(number)?;
    }
    if let Some(name) = &input.name {
        validate_counter_name(name)?;
    }

    let counter = CounterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Counter",
            id,
        })?;

    tracing::info!(counter_id = id, is_active = counter.is_active, "Counter updated");
    state.event_bus.publish(
        QueueEvent::new(EVENT_COUNTER_UPDATED)
            .with_counter(id)
            .with_actor(admin.user_id)
            .with_payload(json!({
                "counter_number": counter.counter_number,
                "name": counter.name,
                "is_active": counter.is_active,
            })),
    );

    Ok(Json(DataResponse { data: counter }))
}

/// DELETE /api/v1/admin/counters/{id}
///
/// Only counters with nobody waiting or called can be removed (409 otherwise).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CounterRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Counter",
            id,
        }
        .into());
    }

    tracing::info!(counter_id = id, "Counter deleted");
    state.event_bus.publish(
        QueueEvent::new(EVENT_COUNTER_DELETED)
            .with_counter(id)
            .with_actor(admin.user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}
