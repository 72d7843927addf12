use chrono::Utc;
use std::time::Duration;
use tokio::time::{interval, Interval};
use tracing::{error, info};

use crate::AppState;
use infra::repos::bookings;

/// Releases slots held by checkouts that were abandoned past the payment window.
pub struct ExpiryService {
    state: AppState,
    interval: Interval,
}

impl ExpiryService {
    pub fn new(state: AppState) -> Self {
        let interval = interval(Duration::from_secs(state.config().expiry_interval_secs.max(1)));
        Self { state, interval }
    }

    pub async fn run(&mut self) {
        info!("Starting unpaid booking expiry service");

        loop {
            self.interval.tick().await;

            if let Err(e) = self.expire_unpaid().await {
                error!("Error expiring unpaid bookings: {}", e);
            }
        }
    }

    async fn expire_unpaid(&self) -> Result<usize, sqlx::Error> {
        let cutoff = self.state.config().unpaid_cutoff(Utc::now());
        let expired = bookings::expire_unpaid(&self.state.db, cutoff).await?;

        for booking in &expired {
            info!(
                "Released unpaid booking {} ({} {}-{})",
                booking.id,
                booking.date,
                booking.start_time.format("%H:%M"),
                booking.end_time.format("%H:%M")
            );
        }

        Ok(expired.len())
    }
}

pub fn spawn_expiry_service(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut service = ExpiryService::new(state);
        service.run().await;
    })
}
