use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::models::slot::{OccupancyState, SlotOccupancy};
use crate::domain::services::grid::OccupancyGrid;

#[derive(Serialize)]
pub struct SlotView {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: i32,
    pub booked: i64,
    pub state: OccupancyState,
}

impl From<&SlotOccupancy> for SlotView {
    fn from(occ: &SlotOccupancy) -> Self {
        Self {
            id: occ.slot.id.clone(),
            start_time: occ.slot.start_time,
            end_time: occ.slot.end_time,
            capacity: occ.slot.capacity,
            booked: occ.booked,
            state: occ.occupancy_state(),
        }
    }
}

#[derive(Serialize)]
pub struct GridRowView {
    pub label: String,
    /// `"booked / capacity"` per day, empty string where no slot exists.
    pub cells: Vec<String>,
}

#[derive(Serialize)]
pub struct GridResponse {
    pub page: i64,
    pub start: NaiveDate,
    pub day_list: Vec<NaiveDate>,
    pub time_frames: Vec<String>,
    pub rows: Vec<GridRowView>,
}

impl GridResponse {
    pub fn new(page: i64, start: NaiveDate, day_list: Vec<NaiveDate>, time_frames: Vec<String>, grid: OccupancyGrid) -> Self {
        let rows = grid
            .rows
            .into_iter()
            .map(|row| GridRowView {
                label: row.label,
                cells: row
                    .cells
                    .into_iter()
                    .map(|cell| match cell {
                        Some((booked, capacity)) => format!("{} / {}", booked, capacity),
                        None => String::new(),
                    })
                    .collect(),
            })
            .collect();

        Self { page, start, day_list, time_frames, rows }
    }
}
