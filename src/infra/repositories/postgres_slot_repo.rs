use crate::domain::models::slot::{Slot, SlotOccupancy};
use crate::domain::ports::{BatchOutcome, SlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PostgresSlotRepo {
    async fn create(&self, slot: &Slot) -> Result<Slot, AppError> {
        sqlx::query_as::<_, Slot>(
            "INSERT INTO slots (id, start_time, end_time, capacity, created_at) VALUES ($1, $2, $3, $4, $5) RETURNING *"
        )
            .bind(&slot.id).bind(slot.start_time).bind(slot.end_time).bind(slot.capacity).bind(slot.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_start(&self, start: DateTime<Utc>) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE start_time = $1")
            .bind(start).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn get_or_create_at(&self, start: DateTime<Utc>, capacity: i32) -> Result<Slot, AppError> {
        let slot = Slot::new(start, capacity);
        sqlx::query(
            "INSERT INTO slots (id, start_time, end_time, capacity, created_at) VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (start_time) DO NOTHING"
        )
            .bind(&slot.id).bind(slot.start_time).bind(slot.end_time).bind(slot.capacity).bind(slot.created_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        // Either our insert or the one that beat us to it.
        self.find_by_start(start).await?.ok_or(AppError::Internal)
    }

    async fn list_with_counts_from(
        &self,
        from: DateTime<Utc>,
        exclude_reservation: Option<&str>,
    ) -> Result<Vec<SlotOccupancy>, AppError> {
        sqlx::query_as::<_, SlotOccupancy>(
            "SELECT s.id, s.start_time, s.end_time, s.capacity, s.created_at, COUNT(r.id) AS booked
             FROM slots s
             LEFT JOIN reservations r ON r.slot_id = s.id AND ($2::text IS NULL OR r.id != $2)
             WHERE s.start_time >= $1
             GROUP BY s.id
             ORDER BY s.start_time ASC"
        )
            .bind(from).bind(exclude_reservation)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_range_with_counts(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SlotOccupancy>, AppError> {
        sqlx::query_as::<_, SlotOccupancy>(
            "SELECT s.id, s.start_time, s.end_time, s.capacity, s.created_at, COUNT(r.id) AS booked
             FROM slots s
             LEFT JOIN reservations r ON r.slot_id = s.id
             WHERE s.start_time >= $1 AND s.start_time < $2
             GROUP BY s.id
             ORDER BY s.start_time ASC"
        )
            .bind(from).bind(to)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn apply_batch(&self, starts: &[DateTime<Utc>], capacity: i32) -> Result<BatchOutcome, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut update_ids: Vec<String> = Vec::new();
        let mut to_create: Vec<Slot> = Vec::new();

        // Lock every existing target row up front so concurrent reservation
        // attempts cannot push a count past the new capacity between the
        // check and the write; the transaction rolls back untouched on the
        // first violation.
        for start in starts {
            let existing = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE start_time = $1 FOR UPDATE")
                .bind(start)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

            match existing {
                Some(slot) => {
                    let booked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE slot_id = $1")
                        .bind(&slot.id)
                        .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
                    if (capacity as i64) < booked {
                        return Err(AppError::CapacityBelowDemand(slot.start_time));
                    }
                    update_ids.push(slot.id);
                }
                None => to_create.push(Slot::new(*start, capacity)),
            }
        }

        for id in &update_ids {
            sqlx::query("UPDATE slots SET capacity = $1 WHERE id = $2")
                .bind(capacity).bind(id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        for slot in &to_create {
            sqlx::query("INSERT INTO slots (id, start_time, end_time, capacity, created_at) VALUES ($1, $2, $3, $4, $5)")
                .bind(&slot.id).bind(slot.start_time).bind(slot.end_time).bind(slot.capacity).bind(slot.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(BatchOutcome { created: to_create.len(), updated: update_ids.len() })
    }
}
