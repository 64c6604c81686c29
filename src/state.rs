use std::sync::Arc;

use chrono_tz::Tz;

use crate::config::Config;
use crate::domain::ports::{
    ReservationNotifier, ReservationRepository, SlotRepository, StaffDirectory,
};
use crate::domain::services::booking::BookingService;
use crate::domain::services::schedule::ScheduleService;
use crate::domain::services::time_frames::ServiceWindow;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub staff_dir: Arc<dyn StaffDirectory>,
    pub notifier: Arc<dyn ReservationNotifier>,
    pub booking_service: Arc<BookingService>,
    pub schedule_service: Arc<ScheduleService>,
    pub window: ServiceWindow,
    pub tz: Tz,
}
