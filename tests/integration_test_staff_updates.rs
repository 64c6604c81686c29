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

fn future_start(days_ahead: i64, time: &str) -> DateTime<Utc> {
    let date: NaiveDate = (Utc::now() + Duration::days(days_ahead))
        .with_timezone(&service_tz())
        .date_naive();
    let t = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
    service_tz()
        .from_local_datetime(&date.and_time(t))
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

async fn setup_reservation(app: &TestApp) -> String {
    let slot = app
        .state
        .slot_repo
        .create(&Slot::new(future_start(3, "10:00"), 2))
        .await
        .unwrap();

    let res = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/reservations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(
                    Body::from(
                        json!({
                            "customer_id": "cust-a",
                            "slot_id": slot.id,
                            "actor_id": "actor-a"
                        })
                        .to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    body["id"].as_str().unwrap().to_string()
}

async fn reassign(
    app: &TestApp,
    reservation_id: &str,
    staff_id: Option<&str>,
    actor_id: &str,
    requested_at: DateTime<Utc>,
) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/reservations/{}/staff", reservation_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(
                    Body::from(
                        json!({
                            "staff_id": staff_id,
                            "actor_id": actor_id,
                            "requested_at": requested_at.to_rfc3339()
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
async fn test_stale_update_from_another_actor_is_rejected() {
    let app = TestApp::new().await;
    app.seed_staff("staff-1", "Sato", true).await;
    let reservation_id = setup_reservation(&app).await;

    // The reservation was last written by actor-a just now; actor-b claims a
    // view from an hour ago.
    let stale = Utc::now() - Duration::hours(1);
    let res = reassign(&app, &reservation_id, Some("staff-1"), "actor-b", stale).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "STALE_UPDATE");

    // The reservation is untouched.
    let reservation = app
        .state
        .reservation_repo
        .find_by_id(&reservation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(reservation.staff_id.is_none());
    assert_eq!(reservation.updated_by.as_deref(), Some("actor-a"));
}

#[tokio::test]
async fn test_same_actor_may_overwrite_their_own_update() {
    let app = TestApp::new().await;
    app.seed_staff("staff-1", "Sato", true).await;
    let reservation_id = setup_reservation(&app).await;

    // Same stale timestamp, but the last writer was actor-a themselves.
    let stale = Utc::now() - Duration::hours(1);
    let res = reassign(&app, &reservation_id, Some("staff-1"), "actor-a", stale).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["staff_id"], "staff-1");
    assert_eq!(body["updated_by"], "actor-a");
}

#[tokio::test]
async fn test_fresh_observation_allows_takeover_and_then_blocks_the_loser() {
    let app = TestApp::new().await;
    app.seed_staff("staff-1", "Sato", true).await;
    app.seed_staff("staff-2", "Suzuki", true).await;
    let reservation_id = setup_reservation(&app).await;

    // actor-b saw the current state, so the reassignment goes through.
    let res = reassign(&app, &reservation_id, Some("staff-2"), "actor-b", Utc::now()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["updated_by"], "actor-b");

    // actor-a still holds the old view and now loses.
    let stale = Utc::now() - Duration::hours(1);
    let res = reassign(&app, &reservation_id, Some("staff-1"), "actor-a", stale).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "STALE_UPDATE");
}

#[tokio::test]
async fn test_reassign_to_unknown_staff_or_unset() {
    let app = TestApp::new().await;
    app.seed_staff("staff-1", "Sato", true).await;
    let reservation_id = setup_reservation(&app).await;

    let res = reassign(&app, &reservation_id, Some("ghost"), "actor-a", Utc::now()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reassign(&app, &reservation_id, Some("staff-1"), "actor-a", Utc::now()).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Unsetting the staff member is a normal reassignment.
    let res = reassign(&app, &reservation_id, None, "actor-a", Utc::now()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["staff_id"].is_null());
}

#[tokio::test]
async fn test_reassign_on_missing_reservation() {
    let app = TestApp::new().await;
    let res = reassign(&app, "no-such-reservation", None, "actor-a", Utc::now()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
