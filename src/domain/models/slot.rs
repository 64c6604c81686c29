use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bookable time unit: one fixed start instant with a finite number of
/// seats. `start_time` is globally unique, so at most one slot exists per
/// instant.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Slot {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(start_time: DateTime<Utc>, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            capacity,
            created_at: Utc::now(),
        }
    }
}

/// Remaining-capacity classification used by customer-facing slot lists.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyState {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "NEARLY_FULL")]
    NearlyFull,
    #[serde(rename = "FULL")]
    Full,
}

/// A slot joined with its current reservation count. The count may have been
/// computed with one reservation excluded, so a reservation being edited does
/// not occupy its own slot.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct SlotOccupancy {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub slot: Slot,
    pub booked: i64,
}

impl SlotOccupancy {
    pub fn is_filled(&self) -> bool {
        self.slot.capacity as i64 <= self.booked
    }

    pub fn occupancy_state(&self) -> OccupancyState {
        occupancy_state(self.slot.capacity, self.booked)
    }
}

/// Classify remaining capacity for display.
///
/// Small slots flip to NEARLY_FULL on absolute remainders; slots of six and
/// up flip below 30% remaining. The 0.005 term rounds fractional percentages
/// up at the cutoff and must not be changed without breaking the displayed
/// states.
pub fn occupancy_state(capacity: i32, booked: i64) -> OccupancyState {
    let rest = capacity as i64 - booked;
    if rest == 0 {
        OccupancyState::Full
    } else if capacity <= 3 && rest <= 1 {
        OccupancyState::NearlyFull
    } else if (capacity == 4 || capacity == 5) && rest <= 2 {
        OccupancyState::NearlyFull
    } else if capacity >= 6 && (rest as f64 / capacity as f64 + 0.005) < 0.3 {
        OccupancyState::NearlyFull
    } else {
        OccupancyState::Open
    }
}
