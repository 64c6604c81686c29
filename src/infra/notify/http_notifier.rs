use crate::domain::models::{reservation::Reservation, slot::Slot};
use crate::domain::ports::ReservationNotifier;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Posts reservation-confirmed events to the external mail sender. The
/// receiving side owns templates and delivery; this service only hands over
/// the facts.
pub struct HttpNotifier {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotifier {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct ConfirmedPayload<'a> {
    event: &'static str,
    reservation_id: &'a str,
    customer_id: &'a str,
    staff_id: Option<&'a str>,
    slot_start_time: DateTime<Utc>,
    slot_end_time: Option<DateTime<Utc>>,
}

#[async_trait]
impl ReservationNotifier for HttpNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation, slot: &Slot) -> Result<(), AppError> {
        let payload = ConfirmedPayload {
            event: "reservation_confirmed",
            reservation_id: &reservation.id,
            customer_id: &reservation.customer_id,
            staff_id: reservation.staff_id.as_deref(),
            slot_start_time: slot.start_time,
            slot_end_time: slot.end_time,
        };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Notification service connection error: {}", e);
                AppError::Internal
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Notification service failed. Status: {}, Body: {}", status, text);
            return Err(AppError::Internal);
        }

        Ok(())
    }
}
