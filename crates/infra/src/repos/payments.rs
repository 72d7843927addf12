use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::PaymentRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    PartiallyRefunded,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

pub async fn create_pending<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
    stripe_session_id: &str,
    amount_cents: i32,
    currency: &str,
) -> SqlxResult<PaymentRow> {
    sqlx::query_as::<_, PaymentRow>(
        r#"
        INSERT INTO payments (booking_id, stripe_session_id, amount_cents, currency, status)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (booking_id) DO UPDATE SET
            stripe_session_id = EXCLUDED.stripe_session_id,
            amount_cents = EXCLUDED.amount_cents,
            updated_at = NOW()
        RETURNING id, booking_id, stripe_session_id, stripe_payment_intent_id, amount_cents,
                  currency, status, created_at, updated_at
        "#,
    )
    .bind(booking_id)
    .bind(stripe_session_id)
    .bind(amount_cents)
    .bind(currency)
    .bind(PaymentStatus::Pending.as_str())
    .fetch_one(executor)
    .await
}

pub async fn mark_succeeded<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
    payment_intent_id: Option<&str>,
) -> SqlxResult<Option<PaymentRow>> {
    sqlx::query_as::<_, PaymentRow>(
        r#"
        UPDATE payments
        SET status = $2,
            stripe_payment_intent_id = COALESCE($3, stripe_payment_intent_id),
            updated_at = NOW()
        WHERE booking_id = $1
        RETURNING id, booking_id, stripe_session_id, stripe_payment_intent_id, amount_cents,
                  currency, status, created_at, updated_at
        "#,
    )
    .bind(booking_id)
    .bind(PaymentStatus::Succeeded.as_str())
    .bind(payment_intent_id)
    .fetch_optional(executor)
    .await
}

pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
    status: PaymentStatus,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        "UPDATE payments SET status = $2, updated_at = NOW() WHERE booking_id = $1",
    )
    .bind(booking_id)
    .bind(status.as_str())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_by_booking<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
) -> SqlxResult<Option<PaymentRow>> {
    sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT id, booking_id, stripe_session_id, stripe_payment_intent_id, amount_cents,
               currency, status, created_at, updated_at
        FROM payments
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(executor)
    .await
}
