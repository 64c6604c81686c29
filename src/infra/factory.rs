use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::booking::BookingService;
use crate::domain::services::schedule::ScheduleService;
use crate::domain::services::time_frames::ServiceWindow;
use crate::infra::notify::http_notifier::HttpNotifier;
use crate::infra::repositories::{
    postgres_reservation_repo::PostgresReservationRepo, postgres_slot_repo::PostgresSlotRepo,
    postgres_staff_repo::PostgresStaffRepo, sqlite_reservation_repo::SqliteReservationRepo,
    sqlite_slot_repo::SqliteSlotRepo, sqlite_staff_repo::SqliteStaffRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let notifier = Arc::new(HttpNotifier::new(
        config.notify_service_url.clone(),
        config.notify_service_token.clone(),
    ));

    let tz: Tz = config
        .service_timezone
        .parse()
        .expect("SERVICE_TIMEZONE must be a valid IANA zone name");
    let window = ServiceWindow::new(config.open_hour, config.close_hour);

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let slot_repo = Arc::new(PostgresSlotRepo::new(pool.clone()));
        let reservation_repo = Arc::new(PostgresReservationRepo::new(pool.clone()));
        let staff_dir = Arc::new(PostgresStaffRepo::new(pool.clone()));

        assemble(config, tz, window, slot_repo, reservation_repo, staff_dir, notifier)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let slot_repo = Arc::new(SqliteSlotRepo::new(pool.clone()));
        let reservation_repo = Arc::new(SqliteReservationRepo::new(pool.clone()));
        let staff_dir = Arc::new(SqliteStaffRepo::new(pool.clone()));

        assemble(config, tz, window, slot_repo, reservation_repo, staff_dir, notifier)
    }
}

fn assemble(
    config: &Config,
    tz: Tz,
    window: ServiceWindow,
    slot_repo: Arc<dyn crate::domain::ports::SlotRepository>,
    reservation_repo: Arc<dyn crate::domain::ports::ReservationRepository>,
    staff_dir: Arc<dyn crate::domain::ports::StaffDirectory>,
    notifier: Arc<dyn crate::domain::ports::ReservationNotifier>,
) -> AppState {
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

    AppState {
        config: config.clone(),
        slot_repo,
        reservation_repo,
        staff_dir,
        notifier,
        booking_service,
        schedule_service,
        window,
        tz,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
