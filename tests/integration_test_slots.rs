mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

use reservation_backend::domain::models::slot::Slot;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn service_tz() -> Tz {
    "Asia/Tokyo".parse().unwrap()
}

/// A service-local date comfortably in the future.
fn future_date(days_ahead: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days_ahead))
        .with_timezone(&service_tz())
        .date_naive()
}

fn local_start(date: NaiveDate, time: &str) -> DateTime<Utc> {
    let t = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
    service_tz()
        .from_local_datetime(&date.and_time(t))
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

async fn post_batch(app: &TestApp, payload: &Value) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/slots/batch")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn reserve(app: &TestApp, customer_id: &str, slot_id: &str) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/reservations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(
                    Body::from(
                        json!({
                            "customer_id": customer_id,
                            "slot_id": slot_id,
                            "actor_id": "admin-1"
                        })
                        .to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_batch_edit_creates_then_updates_idempotently() {
    let app = TestApp::new().await;
    let start = future_date(7);
    let end = start + Duration::days(1);

    let payload = json!({
        "start_date": start.to_string(),
        "end_date": end.to_string(),
        "times": ["10:00", "10:30"],
        "capacity": 3
    });

    let res = post_batch(&app, &payload).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["created"], 4);
    assert_eq!(body["updated"], 0);

    // Same input again: every row already exists with the right capacity.
    let res = post_batch(&app, &payload).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["created"], 0);
    assert_eq!(body["updated"], 4);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 4);

    let capacities: Vec<i32> = sqlx::query_scalar("SELECT capacity FROM slots")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert!(capacities.iter().all(|c| *c == 3));
}

#[tokio::test]
async fn test_batch_edit_resizes_existing_slots() {
    let app = TestApp::new().await;
    let day = future_date(7);

    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["09:00"],
            "capacity": 2
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["09:00"],
            "capacity": 5
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let slot = app
        .state
        .slot_repo
        .find_by_start(local_start(day, "09:00"))
        .await
        .unwrap()
        .expect("slot should exist");
    assert_eq!(slot.capacity, 5);
}

#[tokio::test]
async fn test_batch_edit_rejects_inverted_range() {
    let app = TestApp::new().await;
    let start = future_date(7);

    let res = post_batch(
        &app,
        &json!({
            "start_date": start.to_string(),
            "end_date": (start - Duration::days(1)).to_string(),
            "times": ["10:00"],
            "capacity": 1
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVALID_RANGE");
}

#[tokio::test]
async fn test_batch_edit_rejects_times_outside_catalog() {
    let app = TestApp::new().await;
    let day = future_date(7);

    // 08:00 is before the 9:00 service opening.
    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["08:00"],
            "capacity": 1
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "INVALID_TIMING");

    // 10:15 is not on a bucket boundary.
    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["10:15"],
            "capacity": 1
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Not a time at all.
    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["later"],
            "capacity": 1
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_edit_is_all_or_nothing_when_capacity_below_demand() {
    let app = TestApp::new().await;
    let day = future_date(7);

    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["10:00", "10:30"],
            "capacity": 1
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let booked_slot = app
        .state
        .slot_repo
        .find_by_start(local_start(day, "10:00"))
        .await
        .unwrap()
        .expect("slot should exist");
    let res = reserve(&app, "customer-1", &booked_slot.id).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Shrinking below the booked count rejects the whole batch, including
    // the empty 10:30 slot that alone would have been fine.
    let res = post_batch(
        &app,
        &json!({
            "start_date": day.to_string(),
            "end_date": day.to_string(),
            "times": ["10:00", "10:30"],
            "capacity": 0
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "CAPACITY_BELOW_DEMAND");

    let capacities: Vec<i32> = sqlx::query_scalar("SELECT capacity FROM slots ORDER BY start_time")
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(capacities, vec![1, 1]);
}

#[tokio::test]
async fn test_slot_start_time_is_unique() {
    let app = TestApp::new().await;
    let start = local_start(future_date(7), "11:00");

    let first = app.state.slot_repo.create(&Slot::new(start, 2)).await;
    assert!(first.is_ok());

    let second = app.state.slot_repo.create(&Slot::new(start, 4)).await;
    assert!(second.is_err(), "duplicate start_time must be rejected");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_get_or_create_at_merges_on_existing_start() {
    let app = TestApp::new().await;
    let start = local_start(future_date(7), "12:00");

    let first = app.state.slot_repo.get_or_create_at(start, 1).await.unwrap();
    let second = app.state.slot_repo.get_or_create_at(start, 1).await.unwrap();
    assert_eq!(first.id, second.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
