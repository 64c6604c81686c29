use crate::domain::models::reservation::Reservation;
use crate::domain::models::slot::Slot;
use crate::domain::ports::ReservationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresReservationRepo {
    pool: PgPool,
}

impl PostgresReservationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE customer_id = $1")
            .bind(customer_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_slot(&self, slot_id: &str, excluding: Option<&str>) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE slot_id = $1 AND ($2::text IS NULL OR id != $2)")
            .bind(slot_id).bind(excluding)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    // The check-and-write runs in one transaction holding a row lock on the
    // target slot, so concurrent attempts on the same slot are linearized
    // and the count re-checked under the lock is authoritative. Attempts on
    // other slots never wait on this lock.
    async fn place(&self, reservation: &Reservation, is_update: bool) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = $1 FOR UPDATE")
            .bind(&reservation.slot_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Slot not found".to_string()))?;

        let booked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE slot_id = $1 AND id != $2"
        )
            .bind(&reservation.slot_id).bind(&reservation.id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        if booked >= slot.capacity as i64 {
            return Err(AppError::SlotFilled(slot.start_time));
        }

        let placed = if is_update {
            sqlx::query_as::<_, Reservation>(
                "UPDATE reservations SET slot_id = $1, staff_id = $2, updated_by = $3, updated_at = $4
                 WHERE id = $5 RETURNING *"
            )
                .bind(&reservation.slot_id).bind(&reservation.staff_id)
                .bind(&reservation.updated_by).bind(reservation.updated_at)
                .bind(&reservation.id)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
                .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?
        } else {
            sqlx::query_as::<_, Reservation>(
                "INSERT INTO reservations (id, customer_id, slot_id, staff_id, updated_by, updated_at, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
            )
                .bind(&reservation.id).bind(&reservation.customer_id).bind(&reservation.slot_id)
                .bind(&reservation.staff_id).bind(&reservation.updated_by)
                .bind(reservation.updated_at).bind(reservation.created_at)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(placed)
    }

    async fn update_assignment(&self, reservation: &Reservation) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET staff_id = $1, updated_by = $2, updated_at = $3 WHERE id = $4 RETURNING *"
        )
            .bind(&reservation.staff_id).bind(&reservation.updated_by)
            .bind(reservation.updated_at).bind(&reservation.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation not found".to_string()));
        }
        Ok(())
    }
}
