pub mod bookings;
pub mod payments;
pub mod refunds;
pub mod rooms;
pub mod statistics;

pub use bookings::{BookingFilter, BookingStatus, CreateBooking, RescheduleBooking};
pub use payments::PaymentStatus;
pub use refunds::CreateRefund;
pub use rooms::{CreateRoom, UpdateRoom};
