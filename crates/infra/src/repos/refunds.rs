use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::RefundRow;

#[derive(Debug, Clone)]
pub struct CreateRefund {
    pub booking_id: Uuid,
    pub amount_cents: i32,
    pub percentage: i32,
    pub stripe_refund_id: Option<String>,
    pub reason: String,
    pub status: String,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateRefund,
) -> SqlxResult<RefundRow> {
    sqlx::query_as::<_, RefundRow>(
        r#"
        INSERT INTO refunds (
            booking_id, amount_cents, percentage, stripe_refund_id, reason, status, processed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        RETURNING id, booking_id, amount_cents, percentage, stripe_refund_id, reason, status,
                  processed_at, created_at
        "#,
    )
    .bind(data.booking_id)
    .bind(data.amount_cents)
    .bind(data.percentage)
    .bind(data.stripe_refund_id)
    .bind(data.reason)
    .bind(data.status)
    .fetch_one(executor)
    .await
}

pub async fn get_by_booking<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
) -> SqlxResult<Option<RefundRow>> {
    sqlx::query_as::<_, RefundRow>(
        r#"
        SELECT id, booking_id, amount_cents, percentage, stripe_refund_id, reason, status,
               processed_at, created_at
        FROM refunds
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(executor)
    .await
}
