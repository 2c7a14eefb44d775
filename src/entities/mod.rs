pub mod booking;
pub mod flight;
pub mod passenger;
pub mod schedule;
pub mod transaction;
