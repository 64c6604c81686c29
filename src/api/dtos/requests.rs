use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct BatchEditRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Bucket start times as "HH:MM", drawn from the service-window catalog.
    pub times: Vec<String>,
    pub capacity: i32,
}

#[derive(Deserialize)]
pub struct CreateReservationRequest {
    pub customer_id: String,
    /// Pick one: an existing slot by id, or a free timestamp (RFC 3339 with
    /// offset) off the calendar.
    pub slot_id: Option<String>,
    pub start_time: Option<String>,
    pub staff_id: Option<String>,
    pub actor_id: String,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub customer_id: String,
    pub slot_id: String,
}

#[derive(Deserialize)]
pub struct ReassignStaffRequest {
    pub staff_id: Option<String>,
    pub actor_id: String,
    /// When the caller last saw the reservation; updates by someone else
    /// after this instant reject the request.
    pub requested_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct GridQuery {
    pub page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SelectableQuery {
    pub after_min: Option<i64>,
}

#[derive(Deserialize)]
pub struct OpenSlotsQuery {
    pub customer_id: Option<String>,
}
