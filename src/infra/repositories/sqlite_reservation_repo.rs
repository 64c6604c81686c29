use crate::domain::models::reservation::Reservation;
use crate::domain::models::slot::Slot;
use crate::domain::ports::ReservationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteReservationRepo {
    pool: SqlitePool,
}

impl SqliteReservationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE customer_id = ?")
            .bind(customer_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_slot(&self, slot_id: &str, excluding: Option<&str>) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE slot_id = ? AND (? IS NULL OR id != ?)")
            .bind(slot_id).bind(excluding).bind(excluding)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    // SQLite has no row-level locks; the guarded write below runs as one
    // statement, and SQLite serializes all writers, so the count in the
    // WHERE clause is evaluated while this connection holds the exclusive
    // write lock. Either the guard holds and the row lands, or nothing
    // happens.
    async fn place(&self, reservation: &Reservation, is_update: bool) -> Result<Reservation, AppError> {
        let result = if is_update {
            sqlx::query(
                "UPDATE reservations SET slot_id = ?, staff_id = ?, updated_by = ?, updated_at = ?
                 WHERE id = ?
                   AND (SELECT COUNT(*) FROM reservations r WHERE r.slot_id = ? AND r.id != ?)
                       < (SELECT capacity FROM slots WHERE id = ?)"
            )
                .bind(&reservation.slot_id).bind(&reservation.staff_id)
                .bind(&reservation.updated_by).bind(reservation.updated_at)
                .bind(&reservation.id)
                .bind(&reservation.slot_id).bind(&reservation.id)
                .bind(&reservation.slot_id)
                .execute(&self.pool).await.map_err(AppError::Database)?
        } else {
            sqlx::query(
                "INSERT INTO reservations (id, customer_id, slot_id, staff_id, updated_by, updated_at, created_at)
                 SELECT ?, ?, ?, ?, ?, ?, ?
                 WHERE (SELECT COUNT(*) FROM reservations r WHERE r.slot_id = ?)
                       < (SELECT capacity FROM slots WHERE id = ?)"
            )
                .bind(&reservation.id).bind(&reservation.customer_id).bind(&reservation.slot_id)
                .bind(&reservation.staff_id).bind(&reservation.updated_by)
                .bind(reservation.updated_at).bind(reservation.created_at)
                .bind(&reservation.slot_id)
                .bind(&reservation.slot_id)
                .execute(&self.pool).await.map_err(AppError::Database)?
        };

        if result.rows_affected() == 0 {
            // A missing slot also fails the guard (capacity subquery is
            // NULL); tell the two apart after the fact.
            let slot = sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE id = ?")
                .bind(&reservation.slot_id)
                .fetch_optional(&self.pool).await.map_err(AppError::Database)?
                .ok_or_else(|| AppError::NotFound("Slot not found".to_string()))?;
            if is_update {
                // The guard can also fail because the reservation row itself
                // is gone.
                self.find_by_id(&reservation.id).await?
                    .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
            }
            return Err(AppError::SlotFilled(slot.start_time));
        }

        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
            .bind(&reservation.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_assignment(&self, reservation: &Reservation) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET staff_id = ?, updated_by = ?, updated_at = ? WHERE id = ? RETURNING *"
        )
            .bind(&reservation.staff_id).bind(&reservation.updated_by)
            .bind(reservation.updated_at).bind(&reservation.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reservation not found".to_string()));
        }
        Ok(())
    }
}
