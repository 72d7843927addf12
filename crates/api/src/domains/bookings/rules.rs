//! Pure booking rules: interval overlap, pricing, refund tiers, and the status
//! transitions each actor is allowed to make.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};
use infra::repos::BookingStatus;
use serde::Serialize;

pub const FULL_REFUND_HOURS: i64 = 48;
pub const PARTIAL_REFUND_HOURS: i64 = 24;
pub const PARTIAL_REFUND_PERCENT: i32 = 50;

/// Statuses an admin may set directly through the status endpoint.
pub const ADMIN_SETTABLE_STATUSES: [BookingStatus; 6] = [
    BookingStatus::Confirmed,
    BookingStatus::CheckedIn,
    BookingStatus::InProgress,
    BookingStatus::Completed,
    BookingStatus::NoShow,
    BookingStatus::CancelledByAdmin,
];

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// `None` unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn within(&self, opening: NaiveTime, closing: NaiveTime) -> bool {
        self.start >= opening && self.end <= closing
    }
}

/// Whether `candidate` collides with any existing booking that still holds its slot.
pub fn has_conflict<I>(candidate: &TimeRange, existing: I) -> bool
where
    I: IntoIterator<Item = (TimeRange, BookingStatus)>,
{
    existing
        .into_iter()
        .any(|(range, status)| status.is_blocking() && candidate.overlaps(&range))
}

/// Price of a slot in cents, prorated by the minute and rounded half up.
pub fn total_price_cents(price_per_hour_cents: i32, range: &TimeRange) -> i32 {
    let cents = (i64::from(price_per_hour_cents) * range.minutes() + 30) / 60;
    i32::try_from(cents).unwrap_or(i32::MAX)
}

/// Converts a venue-local date and time into an instant.
pub fn slot_instant(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    (date.and_time(time) - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Refund share owed when cancelling `time_until_start` before the booking begins.
///
/// More than 48 hours: 100. Between 24 and 48 hours, both ends included: 50.
/// Under 24 hours or already started: 0.
pub fn refund_percentage(time_until_start: Duration) -> i32 {
    if time_until_start > Duration::hours(FULL_REFUND_HOURS) {
        100
    } else if time_until_start >= Duration::hours(PARTIAL_REFUND_HOURS) {
        PARTIAL_REFUND_PERCENT
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuote {
    pub percentage: i32,
    pub amount_cents: i32,
    pub hours_until_start: i64,
}

pub fn quote_refund(
    total_price_cents: i32,
    starts_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> RefundQuote {
    let until = starts_at - now;
    let percentage = refund_percentage(until);
    RefundQuote {
        percentage,
        amount_cents: refund_amount_cents(total_price_cents, percentage),
        hours_until_start: until.num_hours(),
    }
}

/// Rounded down to the cent.
pub fn refund_amount_cents(total_price_cents: i32, percentage: i32) -> i32 {
    let cents = i64::from(total_price_cents) * i64::from(percentage) / 100;
    i32::try_from(cents).unwrap_or(0)
}

/// Legal status changes. Terminal statuses have no way out.
pub fn allows_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;

    if from == to {
        return false;
    }
    match from {
        PendingPayment => matches!(
            to,
            PaymentReceived | Confirmed | CancelledByUser | CancelledByAdmin | CancelledNoPayment
        ),
        PaymentReceived => matches!(
            to,
            Confirmed | Modified | CancelledByUser | CancelledByAdmin | Refunded
        ),
        Confirmed | Modified => matches!(
            to,
            Confirmed
                | Modified
                | CheckedIn
                | InProgress
                | Completed
                | NoShow
                | CancelledByUser
                | CancelledByAdmin
                | Refunded
        ),
        CheckedIn => matches!(
            to,
            InProgress | Completed | CancelledByUser | CancelledByAdmin | Refunded
        ),
        InProgress => matches!(to, Completed | CancelledByUser | CancelledByAdmin | Refunded),
        NoShow => matches!(to, CancelledByUser | CancelledByAdmin),
        Completed | CancelledByUser | CancelledByAdmin | CancelledNoPayment | Refunded => false,
    }
}

pub fn is_terminal(status: BookingStatus) -> bool {
    BookingStatus::ALL
        .into_iter()
        .all(|to| !allows_transition(status, to))
}

pub fn customer_can_modify(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::PendingPayment | BookingStatus::PaymentReceived | BookingStatus::Confirmed
    )
}

pub fn admin_can_modify(status: BookingStatus) -> bool {
    !status.is_cancelled() && status != BookingStatus::Completed
}

pub fn can_cancel(status: BookingStatus) -> bool {
    allows_transition(status, BookingStatus::CancelledByUser)
}

/// Status a booking takes after its slot or headcount changed. Unpaid and
/// already running bookings keep theirs.
pub fn status_after_modification(current: BookingStatus) -> BookingStatus {
    if allows_transition(current, BookingStatus::Modified) {
        BookingStatus::Modified
    } else {
        current
    }
}

pub fn is_admin_settable(status: BookingStatus) -> bool {
    ADMIN_SETTABLE_STATUSES.contains(&status)
}

/// One hour of the public availability grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub range: TimeRange,
    pub booked: bool,
    pub past: bool,
}

impl GridSlot {
    pub fn available(&self) -> bool {
        !self.booked && !self.past
    }
}

/// Hourly slots from `opening` up to `closing`. A slot is booked when any
/// blocking range overlaps it, and past when it starts at or before `now`.
pub fn day_grid(
    opening: NaiveTime,
    closing: NaiveTime,
    booked: &[TimeRange],
    now: Option<NaiveTime>,
) -> Vec<GridSlot> {
    let close = closing.num_seconds_from_midnight();
    let mut slots = Vec::new();
    let mut start = opening.num_seconds_from_midnight();

    while start + 3600 <= close {
        let (Some(from), Some(to)) = (
            NaiveTime::from_num_seconds_from_midnight_opt(start, 0),
            NaiveTime::from_num_seconds_from_midnight_opt(start + 3600, 0),
        ) else {
            break;
        };
        let range = TimeRange { start: from, end: to };
        slots.push(GridSlot {
            range,
            booked: booked.iter().any(|b| b.overlaps(&range)),
            past: now.is_some_and(|now| from <= now),
        });
        start += 3600;
    }

    slots
}
