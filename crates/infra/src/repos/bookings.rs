use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{BookedSlotRow, BookingRow, BookingWithRoomRow};
use crate::pagination::LimitOffset;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize,
)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    PaymentReceived,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Modified,
    CancelledByUser,
    CancelledByAdmin,
    CancelledNoPayment,
    NoShow,
    Refunded,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 12] = [
        BookingStatus::PendingPayment,
        BookingStatus::PaymentReceived,
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Modified,
        BookingStatus::CancelledByUser,
        BookingStatus::CancelledByAdmin,
        BookingStatus::CancelledNoPayment,
        BookingStatus::NoShow,
        BookingStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::PaymentReceived => "payment_received",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Modified => "modified",
            BookingStatus::CancelledByUser => "cancelled_by_user",
            BookingStatus::CancelledByAdmin => "cancelled_by_admin",
            BookingStatus::CancelledNoPayment => "cancelled_no_payment",
            BookingStatus::NoShow => "no_show",
            BookingStatus::Refunded => "refunded",
        }
    }

    /// Cancelled in any way, refunds included.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            BookingStatus::CancelledByUser
                | BookingStatus::CancelledByAdmin
                | BookingStatus::CancelledNoPayment
                | BookingStatus::Refunded
        )
    }

    /// Whether a booking in this status occupies its slot.
    ///
    /// Mirrors the `status NOT IN (...)` clause used by the conflict queries below.
    pub fn is_blocking(&self) -> bool {
        !self.is_cancelled()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lowered)
            .ok_or_else(|| format!("Unknown booking status: {}", s))
    }
}

#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub room_id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub number_of_people: i32,
    pub total_price_cents: i32,
    pub status: BookingStatus,
}

#[derive(Debug, Clone)]
pub struct RescheduleBooking {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub number_of_people: i32,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    /// Remember the first date the booking was made for when it moves.
    pub keep_original_date: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub room_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateBooking,
) -> SqlxResult<BookingRow> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        INSERT INTO bookings (
            room_id, user_id, date, start_time, end_time, customer_name, customer_email,
            customer_phone, number_of_people, total_price_cents, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(data.room_id)
    .bind(data.user_id)
    .bind(data.date)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.customer_name)
    .bind(data.customer_email)
    .bind(data.customer_phone)
    .bind(data.number_of_people)
    .bind(data.total_price_cents)
    .bind(data.status)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, room_id, user_id, date, original_date, start_time, end_time,
               customer_name, customer_email, customer_phone, number_of_people,
               total_price_cents, status, stripe_session_id, stripe_payment_id,
               stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_session_id<'e>(
    executor: impl PgExecutor<'e>,
    session_id: &str,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, room_id, user_id, date, original_date, start_time, end_time,
               customer_name, customer_email, customer_phone, number_of_people,
               total_price_cents, status, stripe_session_id, stripe_payment_id,
               stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        FROM bookings
        WHERE stripe_session_id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(executor)
    .await
}

/// Fetch the booking and hold a row lock on it until the surrounding transaction
/// ends. Status changes read and write under this lock.
pub async fn lock_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, room_id, user_id, date, original_date, start_time, end_time,
               customer_name, customer_email, customer_phone, number_of_people,
               total_price_cents, status, stripe_session_id, stripe_payment_id,
               stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
) -> SqlxResult<Vec<BookingWithRoomRow>> {
    sqlx::query_as::<_, BookingWithRoomRow>(
        r#"
        SELECT b.id, b.room_id, b.user_id, b.date, b.original_date, b.start_time, b.end_time,
               b.customer_name, b.customer_email, b.customer_phone, b.number_of_people,
               b.total_price_cents, b.status, b.stripe_session_id, b.stripe_payment_id,
               b.stripe_refund_id, b.cancelled_at, b.reminder_sent_at, b.created_at, b.updated_at,
               r.name AS room_name, r.image_url AS room_image_url
        FROM bookings b
        INNER JOIN rooms r ON r.id = b.room_id
        WHERE b.user_id = $1
        ORDER BY b.date DESC, b.start_time DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: BookingFilter,
    page: Option<LimitOffset>,
) -> SqlxResult<Vec<BookingWithRoomRow>> {
    let p = page.unwrap_or_default();

    sqlx::query_as::<_, BookingWithRoomRow>(
        r#"
        SELECT b.id, b.room_id, b.user_id, b.date, b.original_date, b.start_time, b.end_time,
               b.customer_name, b.customer_email, b.customer_phone, b.number_of_people,
               b.total_price_cents, b.status, b.stripe_session_id, b.stripe_payment_id,
               b.stripe_refund_id, b.cancelled_at, b.reminder_sent_at, b.created_at, b.updated_at,
               r.name AS room_name, r.image_url AS room_image_url
        FROM bookings b
        INNER JOIN rooms r ON r.id = b.room_id
        WHERE ($1::booking_status IS NULL OR b.status = $1)
          AND ($2::uuid IS NULL OR b.room_id = $2)
          AND ($3::date IS NULL OR b.date >= $3)
          AND ($4::date IS NULL OR b.date <= $4)
        ORDER BY b.created_at DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(filter.status)
    .bind(filter.room_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(p.limit)
    .bind(p.offset)
    .fetch_all(executor)
    .await
}

/// Number of bookings matching `filter`, ignoring pagination.
pub async fn count<'e>(executor: impl PgExecutor<'e>, filter: &BookingFilter) -> SqlxResult<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM bookings b
        WHERE ($1::booking_status IS NULL OR b.status = $1)
          AND ($2::uuid IS NULL OR b.room_id = $2)
          AND ($3::date IS NULL OR b.date >= $3)
          AND ($4::date IS NULL OR b.date <= $4)
        "#,
    )
    .bind(filter.status)
    .bind(filter.room_id)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(executor)
    .await
}

/// First blocking booking of the room on `date` whose interval intersects
/// `[start_time, end_time)`. Touching intervals do not intersect.
pub async fn find_conflict<'e>(
    executor: impl PgExecutor<'e>,
    room_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude_id: Option<Uuid>,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, room_id, user_id, date, original_date, start_time, end_time,
               customer_name, customer_email, customer_phone, number_of_people,
               total_price_cents, status, stripe_session_id, stripe_payment_id,
               stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        FROM bookings
        WHERE room_id = $1
          AND date = $2
          AND start_time < $4
          AND $3 < end_time
          AND ($5::uuid IS NULL OR id <> $5)
          AND status NOT IN ('cancelled_by_user', 'cancelled_by_admin',
                             'cancelled_no_payment', 'refunded')
        ORDER BY start_time ASC
        LIMIT 1
        "#,
    )
    .bind(room_id)
    .bind(date)
    .bind(start_time)
    .bind(end_time)
    .bind(exclude_id)
    .fetch_optional(executor)
    .await
}

/// Slots held by blocking bookings of a room in `[from, to]` (open-ended when `to` is `None`).
pub async fn booked_slots<'e>(
    executor: impl PgExecutor<'e>,
    room_id: Uuid,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> SqlxResult<Vec<BookedSlotRow>> {
    sqlx::query_as::<_, BookedSlotRow>(
        r#"
        SELECT date, start_time, end_time
        FROM bookings
        WHERE room_id = $1
          AND date >= $2
          AND ($3::date IS NULL OR date <= $3)
          AND status NOT IN ('cancelled_by_user', 'cancelled_by_admin',
                             'cancelled_no_payment', 'refunded')
        ORDER BY date ASC, start_time ASC
        "#,
    )
    .bind(room_id)
    .bind(from)
    .bind(to)
    .fetch_all(executor)
    .await
}

pub async fn reschedule<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: RescheduleBooking,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET original_date = CASE WHEN $8 THEN COALESCE(original_date, date) ELSE original_date END,
            date = $2,
            start_time = $3,
            end_time = $4,
            number_of_people = $5,
            total_price_cents = $6,
            status = $7,
            reminder_sent_at = CASE WHEN date <> $2 THEN NULL ELSE reminder_sent_at END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(data.date)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.number_of_people)
    .bind(data.total_price_cents)
    .bind(data.status)
    .bind(data.keep_original_date)
    .fetch_optional(executor)
    .await
}

/// Move the booking from `expected` to `status`; cancelled statuses also stamp
/// `cancelled_at` once. Returns `None` when the booking is missing or no longer
/// in `expected`.
pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    expected: BookingStatus,
    status: BookingStatus,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = $2,
            cancelled_at = CASE WHEN $3 THEN COALESCE(cancelled_at, NOW()) ELSE cancelled_at END,
            updated_at = NOW()
        WHERE id = $1 AND status = $4
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(status.is_cancelled())
    .bind(expected)
    .fetch_optional(executor)
    .await
}

/// Same guard as [`update_status`]: nothing changes unless the booking is still `expected`.
pub async fn mark_refunded<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    expected: BookingStatus,
    stripe_refund_id: &str,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = 'refunded',
            stripe_refund_id = $2,
            cancelled_at = COALESCE(cancelled_at, NOW()),
            updated_at = NOW()
        WHERE id = $1 AND status = $3
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(stripe_refund_id)
    .bind(expected)
    .fetch_optional(executor)
    .await
}

pub async fn set_session_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    session_id: &str,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        "UPDATE bookings SET stripe_session_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(session_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Confirm a booking that was waiting on its checkout. Returns `None` when the
/// booking is no longer pending, which makes repeated verification a no-op.
pub async fn confirm_payment<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    stripe_payment_id: Option<&str>,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = 'confirmed',
            stripe_payment_id = COALESCE($2, stripe_payment_id),
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending_payment'
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(stripe_payment_id)
    .fetch_optional(executor)
    .await
}

pub async fn count_by_room<'e>(executor: impl PgExecutor<'e>, room_id: Uuid) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
        .bind(room_id)
        .fetch_one(executor)
        .await
}

/// Bookings on `date` that still need their day-before reminder.
pub async fn due_for_reminder<'e>(
    executor: impl PgExecutor<'e>,
    date: NaiveDate,
) -> SqlxResult<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, room_id, user_id, date, original_date, start_time, end_time,
               customer_name, customer_email, customer_phone, number_of_people,
               total_price_cents, status, stripe_session_id, stripe_payment_id,
               stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        FROM bookings
        WHERE date = $1
          AND status IN ('confirmed', 'modified')
          AND reminder_sent_at IS NULL
        ORDER BY start_time ASC
        "#,
    )
    .bind(date)
    .fetch_all(executor)
    .await
}

pub async fn mark_reminded<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("UPDATE bookings SET reminder_sent_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Release the slots of checkouts that were never paid.
pub async fn expire_unpaid<'e>(
    executor: impl PgExecutor<'e>,
    created_before: DateTime<Utc>,
) -> SqlxResult<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = 'cancelled_no_payment',
            cancelled_at = NOW(),
            updated_at = NOW()
        WHERE status = 'pending_payment' AND created_at < $1
        RETURNING id, room_id, user_id, date, original_date, start_time, end_time,
                  customer_name, customer_email, customer_phone, number_of_people,
                  total_price_cents, status, stripe_session_id, stripe_payment_id,
                  stripe_refund_id, cancelled_at, reminder_sent_at, created_at, updated_at
        "#,
    )
    .bind(created_before)
    .fetch_all(executor)
    .await
}
