pub mod reservation;
pub mod slot;
pub mod staff;
