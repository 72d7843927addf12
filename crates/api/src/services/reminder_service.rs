use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::time::{interval, Interval};
use tracing::{error, info, warn};

use crate::services::email_service::BookingDetails;
use crate::AppState;
use infra::repos::{bookings, rooms};

/// Outcome of one reminder sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSummary {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Emails every confirmed booking happening tomorrow (venue time) that has not
/// been reminded yet, and stamps the ones that went out.
pub async fn send_due_reminders(state: &AppState) -> Result<ReminderSummary, sqlx::Error> {
    let tomorrow = state.config().local_today(Utc::now()) + ChronoDuration::days(1);
    let due = bookings::due_for_reminder(&state.db, tomorrow).await?;

    let mut summary = ReminderSummary {
        due: due.len(),
        ..ReminderSummary::default()
    };

    let Some(email_service) = state.email_service() else {
        if summary.due > 0 {
            warn!(
                "{} reminders due for {} but email is not configured",
                summary.due, tomorrow
            );
        }
        return Ok(summary);
    };

    for booking in due {
        let room_name = rooms::get_by_id(&state.db, booking.room_id)
            .await?
            .map(|room| room.name)
            .unwrap_or_default();
        let details = BookingDetails::new(&booking, &room_name);

        match email_service.send_booking_reminder(&details).await {
            Ok(()) => {
                bookings::mark_reminded(&state.db, booking.id).await?;
                summary.sent += 1;
            }
            Err(e) => {
                warn!("Reminder for booking {} failed: {}", booking.id, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Reminder sweep for {}: {} due, {} sent, {} failed",
        tomorrow, summary.due, summary.sent, summary.failed
    );
    Ok(summary)
}

pub struct ReminderService {
    state: AppState,
    interval: Interval,
}

impl ReminderService {
    pub fn new(state: AppState) -> Self {
        let interval = interval(Duration::from_secs(state.config().reminder_interval_secs.max(1)));
        Self { state, interval }
    }

    pub async fn run(&mut self) {
        info!("Starting reminder service");

        loop {
            self.interval.tick().await;

            if let Err(e) = send_due_reminders(&self.state).await {
                error!("Error sending booking reminders: {}", e);
            }
        }
    }
}

pub fn spawn_reminder_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = ReminderService::new(state);
        service.run().await;
    })
}
