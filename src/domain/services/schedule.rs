use std::sync::Arc;

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::domain::ports::{BatchOutcome, SlotRepository};
use crate::domain::services::time_frames::{date_range, ServiceWindow};
use crate::error::AppError;

/// Administrative batch editor: one operation creates or resizes the whole
/// rectangle `[start_date, end_date]` × selected times of day.
pub struct ScheduleService {
    slots: Arc<dyn SlotRepository>,
    window: ServiceWindow,
    tz: Tz,
}

impl ScheduleService {
    pub fn new(slots: Arc<dyn SlotRepository>, window: ServiceWindow, tz: Tz) -> Self {
        Self { slots, window, tz }
    }

    /// Set every slot in the date range × time selection to `capacity`,
    /// creating missing ones. All-or-nothing: a single slot whose booked
    /// count exceeds the new capacity rejects the whole batch. Re-running
    /// with the same inputs is a no-op on rows that are already correct.
    pub async fn apply(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        times: &[NaiveTime],
        capacity: i32,
    ) -> Result<BatchOutcome, AppError> {
        if end_date < start_date {
            return Err(AppError::InvalidRange);
        }
        if capacity < 0 {
            return Err(AppError::Validation("capacity must not be negative".to_string()));
        }
        let catalog = self.window.start_times();
        for t in times {
            if !catalog.contains(t) {
                return Err(AppError::InvalidTiming(format!(
                    "{} is not a bookable time of day",
                    t.format("%H:%M")
                )));
            }
        }

        let starts = self.expand(start_date, end_date, times);
        let outcome = self.slots.apply_batch(&starts, capacity).await?;
        info!(
            created = outcome.created,
            updated = outcome.updated,
            capacity,
            "slot batch applied"
        );
        Ok(outcome)
    }

    /// Expand calendar days × local times of day into UTC instants. Days are
    /// iterated as calendar days regardless of their elapsed length. An
    /// ambiguous local time resolves to the earlier offset; a nonexistent one
    /// (skipped by a daylight-saving jump) is dropped.
    fn expand(&self, start_date: NaiveDate, end_date: NaiveDate, times: &[NaiveTime]) -> Vec<DateTime<Utc>> {
        let mut starts = Vec::new();
        for day in date_range(start_date, end_date) {
            for t in times {
                match self.tz.from_local_datetime(&day.and_time(*t)) {
                    LocalResult::Single(dt) => starts.push(dt.with_timezone(&Utc)),
                    LocalResult::Ambiguous(earlier, _) => starts.push(earlier.with_timezone(&Utc)),
                    LocalResult::None => {
                        warn!("skipping nonexistent local time {} {}", day, t.format("%H:%M"));
                    }
                }
            }
        }
        starts.sort();
        starts.dedup();
        starts
    }
}
