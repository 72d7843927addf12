pub mod email_service;
pub mod expiry_service;
pub mod payment_service;
pub mod reminder_service;

pub use email_service::{EmailConfig, EmailService};
pub use expiry_service::{spawn_expiry_service, ExpiryService};
pub use payment_service::{StripeConfig, StripeGateway};
pub use reminder_service::{send_due_reminders, spawn_reminder_service, ReminderService};
