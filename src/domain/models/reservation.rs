use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One customer's claim on one seat of a slot. A customer holds at most one
/// reservation at a time (unique `customer_id`).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Reservation {
    pub id: String,
    pub customer_id: String,
    pub slot_id: String,
    pub staff_id: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        customer_id: &str,
        slot_id: &str,
        staff_id: Option<String>,
        actor_id: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            slot_id: slot_id.to_string(),
            staff_id,
            updated_by: actor_id.map(str::to_string),
            updated_at: now,
            created_at: now,
        }
    }

    /// True when someone other than `actor` saved this reservation after
    /// `observed_at` — the caller is about to overwrite a change it never saw.
    pub fn is_updated_by_others(&self, observed_at: DateTime<Utc>, actor: &str) -> bool {
        self.updated_by.as_deref() != Some(actor) && observed_at < self.updated_at
    }
}
