mod common;

use chrono::{Duration, TimeZone, Utc};
use common::TestApp;
use tokio::task::JoinSet;

use reservation_backend::domain::models::slot::Slot;
use reservation_backend::domain::services::booking::SlotSelection;
use reservation_backend::error::AppError;

// The capacity invariant under contention: N concurrent attempts on one
// slot with k seats must produce exactly k reservations, and every loser
// must see "slot filled", not a duplicate seat.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_reservations_never_oversell_a_slot() {
    let app = TestApp::new().await;

    let capacity = 3;
    let attempts = 12;

    let slot = app
        .state
        .slot_repo
        .create(&Slot::new(Utc::now() + Duration::days(2), capacity))
        .await
        .unwrap();

    let mut set = JoinSet::new();
    for i in 0..attempts {
        let service = app.state.booking_service.clone();
        let slot_id = slot.id.clone();
        set.spawn(async move {
            service
                .reserve(
                    SlotSelection::Existing(slot_id),
                    &format!("customer-{}", i),
                    None,
                    Some("admin-1"),
                )
                .await
        });
    }

    let mut succeeded = 0;
    let mut filled = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::SlotFilled(start)) => {
                assert_eq!(start, slot.start_time);
                filled += 1;
            }
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, capacity as usize);
    assert_eq!(filled, attempts - capacity as usize);

    let count = app
        .state
        .reservation_repo
        .count_for_slot(&slot.id, None)
        .await
        .unwrap();
    assert_eq!(count, capacity as i64);
}

// Concurrent calendar picks at the same instant must converge on one slot
// with one seat: one winner, everyone else refused.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_calendar_picks_share_one_slot() {
    let app = TestApp::new().await;

    // A valid 10:00 bucket a few days out, expressed in the service zone.
    let tz = app.state.tz;
    let date = (Utc::now() + Duration::days(3)).with_timezone(&tz).date_naive();
    let start = tz
        .from_local_datetime(&date.and_hms_opt(10, 0, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);

    let mut set = JoinSet::new();
    for i in 0..6 {
        let service = app.state.booking_service.clone();
        set.spawn(async move {
            service
                .reserve(
                    SlotSelection::StartTime(start),
                    &format!("walk-in-{}", i),
                    None,
                    Some("admin-1"),
                )
                .await
        });
    }

    let mut succeeded = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::SlotFilled(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(succeeded, 1);

    let slot_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slots")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(slot_count, 1, "racing picks must merge on one slot row");

    let slot = app
        .state
        .slot_repo
        .find_by_start(start)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(slot.capacity, 1);
    let count = app
        .state
        .reservation_repo
        .count_for_slot(&slot.id, None)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
