use chrono::NaiveDate;
use sqlx::{PgExecutor, Result as SqlxResult};

use crate::models::TopRoomRow;

pub async fn count_active_rooms<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM rooms WHERE is_active = true")
        .fetch_one(executor)
        .await
}

pub async fn count_bookings<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(executor)
        .await
}

/// Bookings whose slot date falls in `[from, to]`.
pub async fn count_bookings_between<'e>(
    executor: impl PgExecutor<'e>,
    from: NaiveDate,
    to: NaiveDate,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE date >= $1 AND date <= $2")
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await
}

pub async fn revenue_cents<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_price_cents), 0)::BIGINT
        FROM bookings
        WHERE status IN ('confirmed', 'modified', 'checked_in', 'in_progress', 'completed')
        "#,
    )
    .fetch_one(executor)
    .await
}

pub async fn count_distinct_users<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM bookings")
        .fetch_one(executor)
        .await
}

pub async fn top_rooms<'e>(
    executor: impl PgExecutor<'e>,
    limit: i64,
) -> SqlxResult<Vec<TopRoomRow>> {
    sqlx::query_as::<_, TopRoomRow>(
        r#"
        SELECT r.id, r.name, r.image_url, COUNT(b.id) AS bookings
        FROM bookings b
        INNER JOIN rooms r ON r.id = b.room_id
        WHERE b.status NOT IN ('cancelled_by_user', 'cancelled_by_admin',
                               'cancelled_no_payment', 'refunded')
        GROUP BY r.id, r.name, r.image_url
        ORDER BY bookings DESC, r.name ASC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}
