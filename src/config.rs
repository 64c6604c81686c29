use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    pub service_timezone: String,
    pub open_hour: u32,
    pub close_hour: u32,
    pub display_days: i64,
    pub min_lead_minutes: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            service_timezone: env::var("SERVICE_TIMEZONE").unwrap_or_else(|_| "Asia/Tokyo".to_string()),
            open_hour: env::var("SERVICE_OPEN_HOUR").unwrap_or_else(|_| "9".to_string()).parse().expect("SERVICE_OPEN_HOUR must be a number"),
            close_hour: env::var("SERVICE_CLOSE_HOUR").unwrap_or_else(|_| "22".to_string()).parse().expect("SERVICE_CLOSE_HOUR must be a number"),
            display_days: env::var("DISPLAY_DAYS").unwrap_or_else(|_| "14".to_string()).parse().expect("DISPLAY_DAYS must be a number"),
            min_lead_minutes: env::var("MIN_LEAD_MINUTES").unwrap_or_else(|_| "60".to_string()).parse().expect("MIN_LEAD_MINUTES must be a number"),
        }
    }
}
