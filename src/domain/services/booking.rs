use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::domain::models::{
    reservation::Reservation,
    slot::{Slot, SlotOccupancy},
};
use crate::domain::ports::{
    ReservationNotifier, ReservationRepository, SlotRepository, StaffDirectory,
};
use crate::domain::services::time_frames::{ServiceWindow, BUCKET_MINUTES};
use crate::error::AppError;

/// How the caller picked the slot: from the open-slot list, or as a free
/// timestamp off a calendar.
#[derive(Debug, Clone)]
pub enum SlotSelection {
    Existing(String),
    StartTime(DateTime<Utc>),
}

/// The capacity guard. Every reservation write funnels through here; the
/// repository's `place` serializes the check-and-insert per slot, this
/// service owns timing validation, on-demand slot creation and the
/// stale-reassignment check.
pub struct BookingService {
    slots: Arc<dyn SlotRepository>,
    reservations: Arc<dyn ReservationRepository>,
    staff: Arc<dyn StaffDirectory>,
    notifier: Arc<dyn ReservationNotifier>,
    window: ServiceWindow,
    tz: Tz,
    min_lead: Duration,
}

impl BookingService {
    pub fn new(
        slots: Arc<dyn SlotRepository>,
        reservations: Arc<dyn ReservationRepository>,
        staff: Arc<dyn StaffDirectory>,
        notifier: Arc<dyn ReservationNotifier>,
        window: ServiceWindow,
        tz: Tz,
        min_lead_minutes: i64,
    ) -> Self {
        Self {
            slots,
            reservations,
            staff,
            notifier,
            window,
            tz,
            min_lead: Duration::minutes(min_lead_minutes),
        }
    }

    /// Upcoming slots an admin may book for `customer_id`. Filled slots are
    /// dropped, except the slot the customer's own reservation sits on: that
    /// one stays selectable (and its count excludes the reservation itself),
    /// so editing a reservation is never blocked by its own seat.
    pub async fn open_slots(&self, customer_id: Option<&str>) -> Result<Vec<SlotOccupancy>, AppError> {
        let current = match customer_id {
            Some(c) => self.reservations.find_by_customer(c).await?,
            None => None,
        };
        let rows = self
            .slots
            .list_with_counts_from(Utc::now(), current.as_ref().map(|r| r.id.as_str()))
            .await?;
        Ok(rows
            .into_iter()
            .filter(|occ| {
                !occ.is_filled() || current.as_ref().is_some_and(|r| r.slot_id == occ.slot.id)
            })
            .collect())
    }

    /// Slots starting at least `after_min` minutes from now, full ones
    /// included — callers render the occupancy state and decide whether a
    /// full slot is selectable.
    pub async fn selectable_slots(&self, after_min: i64) -> Result<Vec<SlotOccupancy>, AppError> {
        self.slots
            .list_with_counts_from(Utc::now() + Duration::minutes(after_min), None)
            .await
    }

    /// Create the customer's reservation, or move the existing one. Staff-side
    /// flow: `actor_id` is the staff user applying the change.
    pub async fn reserve(
        &self,
        selection: SlotSelection,
        customer_id: &str,
        staff_id: Option<String>,
        actor_id: Option<&str>,
    ) -> Result<Reservation, AppError> {
        if let Some(staff) = staff_id.as_deref() {
            if self.staff.find_active(staff).await?.is_none() {
                return Err(AppError::NotFound("Staff member not found or inactive".into()));
            }
        }

        let slot = self.resolve_slot(&selection).await?;
        let existing = self.reservations.find_by_customer(customer_id).await?;

        let placed = match existing {
            Some(mut current) => {
                current.slot_id = slot.id.clone();
                current.staff_id = staff_id;
                current.updated_by = actor_id.map(str::to_string);
                current.updated_at = Utc::now();
                self.reservations.place(&current, true).await?
            }
            None => {
                let reservation = Reservation::new(customer_id, &slot.id, staff_id, actor_id);
                self.reservations.place(&reservation, false).await?
            }
        };

        info!(
            reservation_id = %placed.id,
            slot_start = %slot.start_time,
            "reservation placed"
        );
        Ok(placed)
    }

    /// Customer-facing booking: enforces the lead-time cutoff, reserves, then
    /// fires the confirmation notification without blocking the booking —
    /// a failed notification never rolls the reservation back.
    pub async fn book(&self, slot_id: &str, customer_id: &str) -> Result<Reservation, AppError> {
        let slot = self
            .slots
            .find_by_id(slot_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Slot not found".to_string()))?;

        if slot.start_time < Utc::now() + self.min_lead {
            return Err(AppError::InvalidTiming(format!(
                "bookings must start at least {} minutes from now",
                self.min_lead.num_minutes()
            )));
        }

        let reservation = Reservation::new(customer_id, &slot.id, None, None);
        let placed = self.reservations.place(&reservation, false).await?;

        let notifier = self.notifier.clone();
        let confirmed = placed.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.reservation_confirmed(&confirmed, &slot).await {
                warn!("reservation confirmation notification failed: {}", e);
            }
        });

        Ok(placed)
    }

    /// Reassign the staff member on a reservation, unless someone else
    /// already changed it after the caller last looked (`observed_at`). The
    /// check is optimistic: two reassignments observing the same state can
    /// still race, last writer wins.
    pub async fn reassign_staff(
        &self,
        reservation_id: &str,
        staff_id: Option<String>,
        actor_id: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<Reservation, AppError> {
        let mut reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        if reservation.is_updated_by_others(observed_at, actor_id) {
            return Err(AppError::StaleUpdate);
        }

        if let Some(staff) = staff_id.as_deref() {
            if self.staff.find_active(staff).await?.is_none() {
                return Err(AppError::NotFound("Staff member not found or inactive".into()));
            }
        }

        reservation.staff_id = staff_id;
        reservation.updated_by = Some(actor_id.to_string());
        reservation.updated_at = Utc::now();
        self.reservations.update_assignment(&reservation).await
    }

    pub async fn withdraw(&self, reservation_id: &str) -> Result<(), AppError> {
        self.reservations.delete(reservation_id).await
    }

    async fn resolve_slot(&self, selection: &SlotSelection) -> Result<Slot, AppError> {
        match selection {
            SlotSelection::Existing(id) => {
                let slot = self
                    .slots
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Slot not found".to_string()))?;
                if slot.start_time < Utc::now() {
                    return Err(AppError::InvalidTiming("slot has already started".to_string()));
                }
                Ok(slot)
            }
            SlotSelection::StartTime(start) => {
                let local = start.with_timezone(&self.tz);
                if !self.window.is_valid_booking_time(local.time()) {
                    return Err(AppError::InvalidTiming(format!(
                        "start time must be on a {} minute boundary between {}:00 and {}:00",
                        BUCKET_MINUTES, self.window.open_hour, self.window.close_hour
                    )));
                }
                // Calendar picks may land on an instant with no slot yet;
                // one is created on demand with a single seat.
                self.slots.get_or_create_at(*start, 1).await
            }
        }
    }
}
