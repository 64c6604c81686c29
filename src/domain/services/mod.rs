pub mod booking;
pub mod grid;
pub mod schedule;
pub mod time_frames;
