use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Slot starting at {0} is fully booked")]
    SlotFilled(DateTime<Utc>),
    #[error("Capacity is below the booked count for the slot starting at {0}")]
    CapacityBelowDemand(DateTime<Utc>),
    #[error("Reservation was changed by another user, reload and retry")]
    StaleUpdate,
    #[error("Invalid booking time: {0}")]
    InvalidTiming(String),
    #[error("Start date must be on or before end date")]
    InvalidRange,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable tag so callers can tell "retry later" from
    /// "this request is semantically invalid".
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SlotFilled(_) => "SLOT_FILLED",
            AppError::CapacityBelowDemand(_) => "CAPACITY_BELOW_DEMAND",
            AppError::StaleUpdate => "STALE_UPDATE",
            AppError::InvalidTiming(_) => "INVALID_TIMING",
            AppError::InvalidRange => "INVALID_RANGE",
            AppError::Validation(_) => "VALIDATION",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if code == "2067" || code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "Resource already exists (duplicate entry)",
                                "code": "CONFLICT",
                            })),
                        )
                            .into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SlotFilled(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::CapacityBelowDemand(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::StaleUpdate => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidTiming(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidRange => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
