use reservation_backend::{
    api::router::create_router,
    config::Config,
    domain::models::{reservation::Reservation, slot::Slot},
    domain::ports::ReservationNotifier,
    domain::services::booking::BookingService,
    domain::services::schedule::ScheduleService,
    domain::services::time_frames::ServiceWindow,
    error::AppError,
    infra::repositories::{
        sqlite_reservation_repo::SqliteReservationRepo, sqlite_slot_repo::SqliteSlotRepo,
        sqlite_staff_repo::SqliteStaffRepo,
    },
    state::AppState,
};

use async_trait::async_trait;
use axum::Router;
use chrono_tz::Tz;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct MockNotifier;

#[async_trait]
impl ReservationNotifier for MockNotifier {
    async fn reservation_confirmed(&self, _reservation: &Reservation, _slot: &Slot) -> Result<(), AppError> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
            service_timezone: "Asia/Tokyo".to_string(),
            open_hour: 9,
            close_hour: 22,
            display_days: 14,
            min_lead_minutes: 60,
        };

        let tz: Tz = config.service_timezone.parse().unwrap();
        let window = ServiceWindow::new(config.open_hour, config.close_hour);

        let slot_repo = Arc::new(SqliteSlotRepo::new(pool.clone()));
        let reservation_repo = Arc::new(SqliteReservationRepo::new(pool.clone()));
        let staff_dir = Arc::new(SqliteStaffRepo::new(pool.clone()));
        let notifier = Arc::new(MockNotifier);

        let booking_service = Arc::new(BookingService::new(
            slot_repo.clone(),
            reservation_repo.clone(),
            staff_dir.clone(),
            notifier.clone(),
            window,
            tz,
            config.min_lead_minutes,
        ));
        let schedule_service = Arc::new(ScheduleService::new(slot_repo.clone(), window, tz));

        let state = Arc::new(AppState {
            config,
            slot_repo,
            reservation_repo,
            staff_dir,
            notifier,
            booking_service,
            schedule_service,
            window,
            tz,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_staff(&self, id: &str, name: &str, active: bool) {
        sqlx::query("INSERT INTO staff (id, display_name, is_active) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(active)
            .execute(&self.pool)
            .await
            .expect("failed to seed staff");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
