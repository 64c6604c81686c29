use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::api::dtos::requests::{BookRequest, CreateReservationRequest, ReassignStaffRequest};
use crate::domain::services::booking::SlotSelection;
use crate::error::AppError;
use crate::state::AppState;

fn parse_selection(payload: &CreateReservationRequest) -> Result<SlotSelection, AppError> {
    if let Some(slot_id) = &payload.slot_id {
        return Ok(SlotSelection::Existing(slot_id.clone()));
    }
    if let Some(start) = &payload.start_time {
        let dt = chrono::DateTime::parse_from_rfc3339(start)
            .map_err(|_| AppError::Validation("Invalid ISO time format".to_string()))?;
        return Ok(SlotSelection::StartTime(dt.with_timezone(&Utc)));
    }
    Err(AppError::Validation("Either slot_id or start_time is required".to_string()))
}

/// Staff-side create-or-move: picks a slot from the list or a calendar
/// timestamp on behalf of a customer.
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let selection = parse_selection(&payload)?;
    let reservation = state
        .booking_service
        .reserve(selection, &payload.customer_id, payload.staff_id.clone(), Some(&payload.actor_id))
        .await?;

    info!("Reservation confirmed: {} for customer {}", reservation.id, reservation.customer_id);
    Ok(Json(reservation))
}

/// Customer-facing booking of an open slot. Emits the confirmation
/// notification after commit.
pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state
        .booking_service
        .book(&payload.slot_id, &payload.customer_id)
        .await?;

    info!("Booking confirmed: {} for customer {}", reservation.id, reservation.customer_id);
    Ok(Json(reservation))
}

pub async fn reassign_staff(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<String>,
    Json(payload): Json<ReassignStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state
        .booking_service
        .reassign_staff(
            &reservation_id,
            payload.staff_id.clone(),
            &payload.actor_id,
            payload.requested_at,
        )
        .await?;

    info!("Staff reassigned on reservation {}", reservation.id);
    Ok(Json(reservation))
}

pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Path(reservation_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.booking_service.withdraw(&reservation_id).await?;
    info!("Reservation withdrawn: {}", reservation_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn get_customer_reservation(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = state
        .reservation_repo
        .find_by_customer(&customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
    Ok(Json(reservation))
}
