pub mod admin;
pub mod bookings;
pub mod common;
pub mod payments;
pub mod rooms;
