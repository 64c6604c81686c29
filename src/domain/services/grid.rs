use chrono::{NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::models::slot::SlotOccupancy;
use crate::domain::services::time_frames::{ServiceWindow, TOTAL_LABEL};

/// One grid row: a frame label and one cell per display day. A cell is
/// `Some((booked, capacity))` when a slot with capacity exists for that
/// day and bucket, `None` otherwise.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub label: String,
    pub cells: Vec<Option<(i64, i64)>>,
}

/// The day × time-of-day occupancy matrix, one row per bucket plus a
/// trailing totals row summing booked and capacity per day.
#[derive(Debug, Serialize, Clone)]
pub struct OccupancyGrid {
    pub rows: Vec<GridRow>,
}

/// Build the display grid for `days` days starting at `start_day` (a local
/// calendar date in `tz`). Pure: read-committed occupancy rows go in, the
/// matrix comes out.
///
/// Placement is by local calendar day and exact to-the-minute bucket match.
/// Slots whose time-of-day is not in the bucket catalog and slots with zero
/// capacity are not rendered. Days are calendar days, so daylight-saving
/// transitions do not shift columns.
pub fn build_grid(
    window: &ServiceWindow,
    tz: Tz,
    start_day: NaiveDate,
    days: usize,
    slots: &[SlotOccupancy],
) -> OccupancyGrid {
    let start_times = window.start_times();
    let mut cells: Vec<Vec<Option<(i64, i64)>>> = vec![vec![None; days]; start_times.len()];
    let mut totals: Vec<(i64, i64)> = vec![(0, 0); days];

    for occ in slots {
        let local = occ.slot.start_time.with_timezone(&tz);
        let day_index = (local.date_naive() - start_day).num_days();
        if day_index < 0 || day_index >= days as i64 {
            continue;
        }
        let bucket = start_times
            .iter()
            .position(|t| t.hour() == local.hour() && t.minute() == local.minute());
        let Some(time_index) = bucket else {
            continue;
        };
        if occ.slot.capacity > 0 {
            let day_index = day_index as usize;
            cells[time_index][day_index] = Some((occ.booked, occ.slot.capacity as i64));
            totals[day_index].0 += occ.booked;
            totals[day_index].1 += occ.slot.capacity as i64;
        }
    }

    let mut rows: Vec<GridRow> = window
        .time_frames(false)
        .into_iter()
        .zip(cells)
        .map(|(label, cells)| GridRow { label, cells })
        .collect();
    rows.push(GridRow {
        label: TOTAL_LABEL.to_string(),
        cells: totals.into_iter().map(Some).collect(),
    });

    OccupancyGrid { rows }
}
