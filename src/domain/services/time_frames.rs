use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

/// Width of one booking bucket in minutes.
pub const BUCKET_MINUTES: u32 = 30;

/// Label of the trailing totals row in the occupancy grid.
pub const TOTAL_LABEL: &str = "合計";

/// The daily service window (e.g. 9:00-22:00), divided into fixed 30 minute
/// buckets. Passed explicitly into the schedule and grid code instead of
/// living in global configuration state.
#[derive(Debug, Clone, Copy)]
pub struct ServiceWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl ServiceWindow {
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self { open_hour, close_hour }
    }

    /// Frame labels for grid rows, e.g.
    /// `["9:00~9:30", "9:30~10:00", ..., "21:30~22:00"]`, plus the totals
    /// label when `with_total` is set.
    pub fn time_frames(&self, with_total: bool) -> Vec<String> {
        let mut result = Vec::new();
        for h in self.open_hour..self.close_hour {
            result.push(format!("{}:00~{}:30", h, h));
            result.push(format!("{}:30~{}:00", h, h + 1));
        }
        if with_total {
            result.push(TOTAL_LABEL.to_string());
        }
        result
    }

    /// Bucket start times, e.g. `[09:00, 09:30, ..., 21:30]`.
    pub fn start_times(&self) -> Vec<NaiveTime> {
        let mut result = Vec::new();
        for h in self.open_hour..self.close_hour {
            result.push(NaiveTime::from_hms_opt(h, 0, 0).unwrap());
            result.push(NaiveTime::from_hms_opt(h, 30, 0).unwrap());
        }
        result
    }

    pub fn is_valid_hour(&self, t: NaiveTime) -> bool {
        self.open_hour <= t.hour() && t.hour() < self.close_hour
    }

    pub fn is_valid_minute(&self, t: NaiveTime) -> bool {
        (t.minute() == 0 || t.minute() == BUCKET_MINUTES) && t.second() == 0
    }

    /// Whether a local time-of-day lands on a bookable bucket boundary.
    pub fn is_valid_booking_time(&self, t: NaiveTime) -> bool {
        self.is_valid_hour(t) && self.is_valid_minute(t)
    }
}

/// Inclusive calendar-day range. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days();
    (0..=days).map(move |n| start + Duration::days(n))
}
