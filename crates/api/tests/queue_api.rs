//! HTTP-level tests for the customer queue and the staff counter workflow.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, get_auth, post_auth, post_json, post_json_auth};
use queuedesk_core::roles::{ROLE_CUSTOMER, ROLE_STAFF};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn join_as_guest(pool: &PgPool, name: &str) -> Value {
    let body = json!({ "customer_name": name, "customer_phone": "555-0199" });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/queue/join", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn staff_token(pool: &PgPool) -> String {
    common::create_user(pool, "staff@example.com", ROLE_STAFF).await;
    common::login(pool, "staff@example.com").await
}

// ---------------------------------------------------------------------------
// Joining
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn join_without_active_counters_is_409(pool: PgPool) {
    let body = json!({ "customer_name": "Ana", "customer_phone": "555" });
    let response = post_json(common::build_test_app(pool), "/api/v1/queue/join", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "NO_ACTIVE_COUNTERS");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_must_give_name_and_phone(pool: PgPool) {
    common::create_counter(&pool, 1).await;

    let body = json!({ "customer_name": "Ana" });
    let response = post_json(common::build_test_app(pool), "/api/v1/queue/join", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn guest_join_returns_ticket_at_front(pool: PgPool) {
    let counter = common::create_counter(&pool, 1).await;

    let ticket = join_as_guest(&pool, "Ana").await;

    assert!(ticket["ticket_id"].is_string());
    assert_eq!(ticket["status"], "waiting");
    assert_eq!(ticket["position_in_queue"], 1);
    assert_eq!(ticket["people_ahead"], 0);
    assert_eq!(ticket["almost_your_turn"], true);
    assert_eq!(ticket["counter"]["id"], counter.id);
    assert_eq!(ticket["counter"]["counter_number"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joins_spread_across_counters(pool: PgPool) {
    let first = common::create_counter(&pool, 1).await;
    let second = common::create_counter(&pool, 2).await;

    let a = join_as_guest(&pool, "A").await;
    let b = join_as_guest(&pool, "B").await;
    let c = join_as_guest(&pool, "C").await;

    assert_eq!(a["counter"]["id"], first.id);
    assert_eq!(b["counter"]["id"], second.id);
    assert_eq!(c["counter"]["id"], first.id);
    assert_eq!(c["position_in_queue"], 2);
    assert_eq!(c["people_ahead"], 1);
    assert!(c["token_number"].as_i64() > a["token_number"].as_i64());

    let response = get(common::build_test_app(pool), "/api/v1/queue/overview").await;
    assert_eq!(response.status(), StatusCode::OK);
    let board = body_json(response).await["data"].clone();
    assert_eq!(board[0]["waiting"], 2);
    assert_eq!(board[1]["waiting"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signed_in_customer_joins_with_profile_once(pool: PgPool) {
    common::create_counter(&pool, 1).await;
    common::create_user(&pool, "cust@example.com", ROLE_CUSTOMER).await;
    let token = common::login(&pool, "cust@example.com").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/queue/join",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/queue/join",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signed_in_customer_recovers_lost_ticket(pool: PgPool) {
    common::create_counter(&pool, 1).await;
    common::create_user(&pool, "cust@example.com", ROLE_CUSTOMER).await;
    let token = common::login(&pool, "cust@example.com").await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/queue/tickets/mine").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/queue/tickets/mine",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/queue/join",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let joined = body_json(response).await["data"].clone();

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/queue/tickets/mine",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let mine = body_json(response).await["data"].clone();
    assert_eq!(mine["ticket_id"], joined["ticket_id"]);
    assert_eq!(mine["position_in_queue"], 1);

    // With the id back in hand the customer can leave and join again.
    let uri = format!("/api/v1/queue/tickets/{}", mine["ticket_id"].as_str().unwrap());
    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/queue/join",
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_token_on_join_is_rejected(pool: PgPool) {
    common::create_counter(&pool, 1).await;
    let body = json!({ "customer_name": "Ana", "customer_phone": "555" });
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/queue/join",
        body,
        "expired-or-forged",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_ticket_is_404(pool: PgPool) {
    let uri = format!("/api/v1/queue/tickets/{}", uuid::Uuid::new_v4());
    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn leaving_moves_everyone_behind_up(pool: PgPool) {
    common::create_counter(&pool, 1).await;
    let first = join_as_guest(&pool, "First").await;
    let second = join_as_guest(&pool, "Second").await;
    assert_eq!(second["position_in_queue"], 2);

    let first_uri = format!("/api/v1/queue/tickets/{}", first["ticket_id"].as_str().unwrap());
    let response = delete(common::build_test_app(pool.clone()), &first_uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool.clone()), &first_uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool.clone()), &first_uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let second_uri = format!("/api/v1/queue/tickets/{}", second["ticket_id"].as_str().unwrap());
    let response = get(common::build_test_app(pool), &second_uri).await;
    let ticket = body_json(response).await["data"].clone();
    assert_eq!(ticket["position_in_queue"], 1);
    assert_eq!(ticket["people_ahead"], 0);
}

// ---------------------------------------------------------------------------
// Staff workflow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_routes_require_staff_role(pool: PgPool) {
    let counter = common::create_counter(&pool, 1).await;
    let uri = format!("/api/v1/staff/counters/{}/call-next", counter.id);

    let response = post_json(common::build_test_app(pool.clone()), &uri, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    common::create_user(&pool, "cust@example.com", ROLE_CUSTOMER).await;
    let token = common::login(&pool, "cust@example.com").await;
    let response = post_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn call_serve_and_rate_a_ticket(pool: PgPool) {
    let counter = common::create_counter(&pool, 1).await;
    let token = staff_token(&pool).await;
    let ticket = join_as_guest(&pool, "Ana").await;
    join_as_guest(&pool, "Ben").await;

    let ticket_uri = format!("/api/v1/queue/tickets/{}", ticket["ticket_id"].as_str().unwrap());
    let feedback_uri = format!("{ticket_uri}/feedback");

    // Feedback before service is refused.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &feedback_uri,
        json!({ "rating": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let call_uri = format!("/api/v1/staff/counters/{}/call-next", counter.id);
    let response = post_auth(common::build_test_app(pool.clone()), &call_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let called = body_json(response).await["data"].clone();
    assert_eq!(called["token_number"], ticket["token_number"]);

    // A second call while a customer is at the counter is a conflict.
    let response = post_auth(common::build_test_app(pool.clone()), &call_uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(common::build_test_app(pool.clone()), &ticket_uri).await;
    let view = body_json(response).await["data"].clone();
    assert_eq!(view["status"], "called");
    assert_eq!(view["position_in_queue"], 0);

    let queue_uri = format!("/api/v1/staff/counters/{}/queue", counter.id);
    let response = get_auth(common::build_test_app(pool.clone()), &queue_uri, &token).await;
    let queue = body_json(response).await["data"].clone();
    assert_eq!(queue["current"]["token_number"], ticket["token_number"]);
    assert_eq!(queue["waiting"].as_array().unwrap().len(), 1);
    assert_eq!(queue["waiting"][0]["position_in_queue"], 1);

    let serve_uri = format!("/api/v1/staff/counters/{}/serve-next", counter.id);
    let response = post_auth(common::build_test_app(pool.clone()), &serve_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let served = body_json(response).await["data"].clone();
    assert_eq!(served["token_number"], ticket["token_number"]);
    assert_eq!(served["status_id"], 3);

    // A served ticket can no longer leave.
    let response = delete(common::build_test_app(pool.clone()), &ticket_uri).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &feedback_uri,
        json!({ "rating": 6 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &feedback_uri,
        json!({ "rating": 4, "comments": "  Quick and friendly  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let feedback = body_json(response).await["data"].clone();
    assert_eq!(feedback["rating"], 4);
    assert_eq!(feedback["comments"], "Quick and friendly");
    assert_eq!(feedback["counter_id"], counter.id);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &feedback_uri,
        json!({ "rating": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Feedback has already been submitted for this ticket"
    );

    let uri = format!("/api/v1/staff/counters/{}/feedback", counter.id);
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    let rows = body_json(response).await["data"].clone();
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_counter_returns_null_and_unknown_counter_404(pool: PgPool) {
    let counter = common::create_counter(&pool, 1).await;
    let token = staff_token(&pool).await;

    let uri = format!("/api/v1/staff/counters/{}/call-next", counter.id);
    let response = post_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let response = post_auth(
        common::build_test_app(pool),
        "/api/v1/staff/counters/9999/call-next",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn serve_specific_entry_and_claim_counter(pool: PgPool) {
    let counter = common::create_counter(&pool, 1).await;
    let token = staff_token(&pool).await;
    join_as_guest(&pool, "Ana").await;
    let second = join_as_guest(&pool, "Ben").await;

    let claim_uri = format!("/api/v1/staff/counters/{}/claim", counter.id);
    let response = post_auth(common::build_test_app(pool.clone()), &claim_uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["current_staff_id"].is_number());

    let entry = queuedesk_db::repositories::QueueEntryRepo::find_by_ticket(
        &pool,
        second["ticket_id"].as_str().unwrap().parse().unwrap(),
    )
    .await
    .unwrap()
    .unwrap();

    let uri = format!("/api/v1/staff/entries/{}/serve", entry.id);
    let response = post_auth(common::build_test_app(pool.clone()), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}
