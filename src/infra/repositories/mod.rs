pub mod sqlite_reservation_repo;
pub mod sqlite_slot_repo;
pub mod sqlite_staff_repo;

pub mod postgres_reservation_repo;
pub mod postgres_slot_repo;
pub mod postgres_staff_repo;
