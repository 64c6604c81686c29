use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveTime, TimeZone, Utc};
use tracing::info;

use crate::api::dtos::requests::{BatchEditRequest, GridQuery, OpenSlotsQuery, SelectableQuery};
use crate::api::dtos::responses::{GridResponse, SlotView};
use crate::domain::services::grid::build_grid;
use crate::error::AppError;
use crate::state::AppState;

/// The paged day × time-of-day occupancy grid, anchored at today 00:00 in
/// the service zone.
pub async fn grid(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GridQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(0);
    let days = state.config.display_days;

    let today = Utc::now().with_timezone(&state.tz).date_naive();
    let offset = page
        .checked_mul(days)
        .ok_or_else(|| AppError::Validation("page out of range".to_string()))?;
    let start_day = today
        .checked_add_signed(Duration::days(offset))
        .ok_or_else(|| AppError::Validation("page out of range".to_string()))?;
    let end_day = start_day
        .checked_add_signed(Duration::days(days))
        .ok_or_else(|| AppError::Validation("page out of range".to_string()))?;

    let from = state
        .tz
        .from_local_datetime(&start_day.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .ok_or(AppError::Internal)?
        .with_timezone(&Utc);
    let to = state
        .tz
        .from_local_datetime(&end_day.and_hms_opt(0, 0, 0).unwrap())
        .earliest()
        .ok_or(AppError::Internal)?
        .with_timezone(&Utc);

    let rows = state.slot_repo.list_range_with_counts(from, to).await?;
    let grid = build_grid(&state.window, state.tz, start_day, days as usize, &rows);

    let day_list = (0..days).map(|i| start_day + Duration::days(i)).collect();
    let response = GridResponse::new(page, start_day, day_list, state.window.time_frames(true), grid);
    Ok(Json(response))
}

/// Create or resize a rectangle of slots: date range × selected times, all
/// with the same capacity.
pub async fn batch_edit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchEditRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut times = Vec::with_capacity(payload.times.len());
    for t in &payload.times {
        let parsed = NaiveTime::parse_from_str(t, "%H:%M")
            .map_err(|_| AppError::Validation(format!("Invalid time format (HH:MM): {}", t)))?;
        times.push(parsed);
    }

    let outcome = state
        .schedule_service
        .apply(payload.start_date, payload.end_date, &times, payload.capacity)
        .await?;

    info!(
        "slot batch edit applied: {} .. {} ({} times, capacity {})",
        payload.start_date,
        payload.end_date,
        times.len(),
        payload.capacity
    );
    Ok(Json(outcome))
}

/// Bookable slots for an admin placing or moving a reservation. With
/// `customer_id`, the customer's current slot stays listed even when full.
pub async fn open_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OpenSlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .booking_service
        .open_slots(query.customer_id.as_deref())
        .await?;
    Ok(Json(rows.iter().map(SlotView::from).collect::<Vec<_>>()))
}

/// Customer-visible slot list, full slots included, with occupancy state.
pub async fn selectable_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectableQuery>,
) -> Result<impl IntoResponse, AppError> {
    let after_min = query.after_min.unwrap_or(state.config.min_lead_minutes);
    let rows = state.booking_service.selectable_slots(after_min).await?;
    Ok(Json(rows.iter().map(SlotView::from).collect::<Vec<_>>()))
}
