use crate::domain::models::{
    reservation::Reservation,
    slot::{Slot, SlotOccupancy},
    staff::StaffMember,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
}

#[async_trait]
pub trait SlotRepository: Send + Sync {
    async fn create(&self, slot: &Slot) -> Result<Slot, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError>;
    async fn find_by_start(&self, start: DateTime<Utc>) -> Result<Option<Slot>, AppError>;
    /// Insert a slot at `start` unless one already exists, then return
    /// whichever row won. The loser of a concurrent create falls back to the
    /// winner's row.
    async fn get_or_create_at(&self, start: DateTime<Utc>, capacity: i32) -> Result<Slot, AppError>;
    /// Slots with `start_time >= from`, ordered ascending, each with its
    /// reservation count. `exclude_reservation` removes that reservation from
    /// its own slot's count.
    async fn list_with_counts_from(
        &self,
        from: DateTime<Utc>,
        exclude_reservation: Option<&str>,
    ) -> Result<Vec<SlotOccupancy>, AppError>;
    /// Slots with `from <= start_time < to`, ordered ascending, with counts.
    async fn list_range_with_counts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SlotOccupancy>, AppError>;
    /// All-or-nothing batch upsert: every existing slot in `starts` gets
    /// `capacity`, missing ones are created with it. Fails with
    /// `CapacityBelowDemand` (and writes nothing) if any existing slot
    /// already holds more reservations than `capacity`.
    async fn apply_batch(&self, starts: &[DateTime<Utc>], capacity: i32) -> Result<BatchOutcome, AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError>;
    async fn find_by_customer(&self, customer_id: &str) -> Result<Option<Reservation>, AppError>;
    async fn count_for_slot(&self, slot_id: &str, excluding: Option<&str>) -> Result<i64, AppError>;
    /// The capacity-guarded write. Checks the target slot's filled state
    /// (excluding the reservation itself when moving) and inserts or updates
    /// the row as one atomic unit against concurrent attempts on the same
    /// slot. Fails with `SlotFilled` when capacity is reached and `NotFound`
    /// when the slot vanished.
    async fn place(&self, reservation: &Reservation, is_update: bool) -> Result<Reservation, AppError>;
    /// Staff reassignment write: `staff_id`, `updated_by`, `updated_at`.
    async fn update_assignment(&self, reservation: &Reservation) -> Result<Reservation, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn list_active(&self) -> Result<Vec<StaffMember>, AppError>;
    async fn find_active(&self, id: &str) -> Result<Option<StaffMember>, AppError>;
}

#[async_trait]
pub trait ReservationNotifier: Send + Sync {
    async fn reservation_confirmed(&self, reservation: &Reservation, slot: &Slot) -> Result<(), AppError>;
}
