use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc,
};

pub const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";

const MIN_PAYMENT_WINDOW_MINUTES: i64 = 30;
const MAX_PAYMENT_WINDOW_MINUTES: i64 = 23 * 60;
const EXPIRY_GRACE_MINUTES: i64 = 5;

/// Business settings shared by the booking, payment and background services.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub frontend_base_url: String,
    pub admin_email: Option<String>,
    /// Offset of the venue's wall clock from UTC. Booking dates and times are
    /// interpreted in this offset.
    pub business_offset: FixedOffset,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub payment_window_minutes: i64,
    pub reminder_interval_secs: u64,
    pub expiry_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
            admin_email: None,
            business_offset: Utc.fix(),
            opening_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            closing_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
            payment_window_minutes: MIN_PAYMENT_WINDOW_MINUTES,
            reminder_interval_secs: 3600,
            expiry_interval_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let offset_minutes: i32 = parse_env("BUSINESS_UTC_OFFSET_MINUTES", 0)?;
        let business_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("BUSINESS_UTC_OFFSET_MINUTES is out of range"))?;

        let opening_time = parse_time_env("OPENING_TIME", defaults.opening_time)?;
        let closing_time = parse_time_env("CLOSING_TIME", defaults.closing_time)?;
        if opening_time >= closing_time {
            return Err(anyhow!("OPENING_TIME must be before CLOSING_TIME"));
        }

        let payment_window_minutes: i64 =
            parse_env("PAYMENT_WINDOW_MINUTES", defaults.payment_window_minutes)?;

        Ok(Self {
            frontend_base_url: env::var("FRONTEND_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            business_offset,
            opening_time,
            closing_time,
            payment_window_minutes: payment_window_minutes
                .clamp(MIN_PAYMENT_WINDOW_MINUTES, MAX_PAYMENT_WINDOW_MINUTES),
            reminder_interval_secs: parse_env(
                "REMINDER_INTERVAL_SECONDS",
                defaults.reminder_interval_secs,
            )?,
            expiry_interval_secs: parse_env(
                "EXPIRY_INTERVAL_SECONDS",
                defaults.expiry_interval_secs,
            )?,
        })
    }

    /// Current wall-clock time at the venue.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.business_offset).naive_local()
    }

    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_now(now).date()
    }

    /// Expiry handed to the checkout session. One minute past the window so the
    /// expiry sweep never releases a slot whose session can still be paid.
    pub fn checkout_expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::minutes(self.payment_window_minutes + 1)
    }

    /// Unpaid bookings created before this instant are released.
    pub fn unpaid_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::minutes(self.payment_window_minutes + EXPIRY_GRACE_MINUTES)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

fn parse_time_env(key: &str, default: NaiveTime) -> Result<NaiveTime> {
    match env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .with_context(|| format!("{key} must use the HH:MM format")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_time_follows_business_offset() {
        let config = AppConfig {
            business_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
            ..AppConfig::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 6, 30, 23, 30, 0).unwrap();

        assert_eq!(
            config.local_today(now),
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
        );
    }

    #[test]
    fn checkout_outlives_the_expiry_sweep() {
        let config = AppConfig::default();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        let expires = config.checkout_expires_at(now);
        let cutoff_when_expired = config.unpaid_cutoff(expires);
        assert!(cutoff_when_expired < now);
    }
}
