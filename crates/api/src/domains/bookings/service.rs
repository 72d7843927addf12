use chrono::{DateTime, Utc};
use infra::models::{BookingRow, RefundRow, RoomRow};
use infra::repos::{
    bookings, payments, refunds, rooms, BookingStatus, CreateBooking, CreateRefund, PaymentStatus,
    RescheduleBooking,
};
use sqlx::PgConnection;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domains::bookings::rules::{self, RefundQuote, TimeRange};
use crate::domains::bookings::types::{CreateBookingRequest, ModifyBookingRequest};
use crate::domains::bookings::validation::{self, BookingWindow};
use crate::error::AppError;
use crate::services::email_service::{spawn_email, BookingDetails, EmailType, RefundNotice};
use crate::AppState;

/// Who is driving a change. Admins bypass ownership and use the wider
/// modification rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acting {
    Customer,
    Admin,
}

impl Acting {
    fn cancelled_status(self) -> BookingStatus {
        match self {
            Acting::Customer => BookingStatus::CancelledByUser,
            Acting::Admin => BookingStatus::CancelledByAdmin,
        }
    }

    fn default_reason(self) -> &'static str {
        match self {
            Acting::Customer => "Cancelled by customer",
            Acting::Admin => "Cancelled by administrator",
        }
    }
}

pub fn booking_window(state: &AppState, now: DateTime<Utc>) -> BookingWindow {
    let config = state.config();
    BookingWindow {
        opening: config.opening_time,
        closing: config.closing_time,
        now: config.local_now(now),
    }
}

pub fn refund_quote(state: &AppState, booking: &BookingRow, now: DateTime<Utc>) -> RefundQuote {
    let starts_at = rules::slot_instant(
        booking.date,
        booking.start_time,
        state.config().business_offset,
    );
    rules::quote_refund(booking.total_price_cents, starts_at, now)
}

/// Loads a booking the caller may see. Other users' bookings read as missing.
pub async fn load_accessible(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
) -> Result<BookingRow, AppError> {
    bookings::get_by_id(&state.db, id)
        .await?
        .filter(|booking| user.can_access(&booking.user_id))
        .ok_or_else(AppError::booking_not_found)
}

fn ensure_capacity(room: &RoomRow, people: i32) -> Result<(), AppError> {
    if people > room.capacity {
        return Err(AppError::field(
            "numberOfPeople",
            format!("This room holds at most {} people", room.capacity),
        ));
    }
    Ok(())
}

async fn ensure_slot_free(
    conn: &mut PgConnection,
    room_id: Uuid,
    date: chrono::NaiveDate,
    range: &TimeRange,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(existing) =
        bookings::find_conflict(&mut *conn, room_id, date, range.start, range.end, exclude).await?
    {
        return Err(AppError::conflict(
            "TIME_CONFLICT",
            format!(
                "This room is already booked from {} to {} on {}",
                existing.start_time.format("%H:%M"),
                existing.end_time.format("%H:%M"),
                existing.date
            ),
        ));
    }
    Ok(())
}

/// Validates and stores a new booking. The room row stays locked from the
/// conflict check until commit, so two requests for the same slot cannot both pass.
pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    req: &CreateBookingRequest,
    status: BookingStatus,
) -> Result<(BookingRow, RoomRow), AppError> {
    let input = validation::validate_new_booking(req, &booking_window(state, Utc::now()))
        .map_err(AppError::Validation)?;

    let mut tx = state.db.begin().await?;

    let room = rooms::lock_for_update(&mut *tx, input.room_id)
        .await?
        .filter(|room| room.is_active)
        .ok_or_else(AppError::room_not_found)?;
    ensure_capacity(&room, input.number_of_people)?;
    ensure_slot_free(&mut tx, room.id, input.date, &input.range, None).await?;

    let booking = bookings::create(
        &mut *tx,
        CreateBooking {
            room_id: room.id,
            user_id: user.id.clone(),
            date: input.date,
            start_time: input.range.start,
            end_time: input.range.end,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            customer_phone: input.customer_phone,
            number_of_people: input.number_of_people,
            total_price_cents: rules::total_price_cents(room.price_per_hour_cents, &input.range),
            status,
        },
    )
    .await?;

    tx.commit().await?;

    info!(
        "Booking {} created for room {} on {} {}-{} ({})",
        booking.id,
        room.name,
        booking.date,
        booking.start_time.format("%H:%M"),
        booking.end_time.format("%H:%M"),
        booking.status
    );
    Ok((booking, room))
}

/// Moves a booking to a new date, time or headcount and reprices it.
pub async fn modify_booking(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
    acting: Acting,
    req: &ModifyBookingRequest,
) -> Result<(BookingRow, RoomRow), AppError> {
    let room_id = load_accessible(state, id, user).await?.room_id;

    let mut tx = state.db.begin().await?;
    let room = rooms::lock_for_update(&mut *tx, room_id)
        .await?
        .ok_or_else(AppError::room_not_found)?;

    // Re-read under the room lock, then hold the booking row as well.
    let current = bookings::lock_for_update(&mut *tx, id)
        .await?
        .ok_or_else(AppError::booking_not_found)?;

    let modifiable = match acting {
        Acting::Customer => rules::customer_can_modify(current.status),
        Acting::Admin => rules::admin_can_modify(current.status),
    };
    if !modifiable {
        return Err(AppError::bad_request(
            "BOOKING_NOT_MODIFIABLE",
            format!("A booking with status {} cannot be modified", current.status),
        ));
    }

    let window = booking_window(state, Utc::now());
    if acting == Acting::Customer && current.date.and_time(current.start_time) <= window.now {
        return Err(AppError::bad_request(
            "BOOKING_NOT_MODIFIABLE",
            "A booking that has already started cannot be modified",
        ));
    }

    let change = validation::validate_slot_change(req, &current, &window)
        .map_err(AppError::Validation)?;
    ensure_capacity(&room, change.number_of_people)?;
    if change.moves_slot(&current) {
        ensure_slot_free(&mut tx, room.id, change.date, &change.range, Some(current.id)).await?;
    }

    let updated = bookings::reschedule(
        &mut *tx,
        current.id,
        RescheduleBooking {
            date: change.date,
            start_time: change.range.start,
            end_time: change.range.end,
            number_of_people: change.number_of_people,
            total_price_cents: rules::total_price_cents(room.price_per_hour_cents, &change.range),
            status: rules::status_after_modification(current.status),
            keep_original_date: change.date != current.date,
        },
    )
    .await?
    .ok_or_else(AppError::booking_not_found)?;

    tx.commit().await?;

    if updated.total_price_cents != current.total_price_cents
        && current.stripe_payment_id.is_some()
    {
        warn!(
            "Paid booking {} repriced from {} to {} cents; settle the difference manually",
            updated.id, current.total_price_cents, updated.total_price_cents
        );
    }
    info!("Booking {} modified ({:?})", updated.id, acting);

    spawn_email(
        state.email_service(),
        EmailType::Modified(BookingDetails::new(&updated, &room.name)),
    );
    Ok((updated, room))
}

#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: BookingRow,
    pub quote: RefundQuote,
    pub refund: Option<RefundRow>,
}

fn ensure_cancellable(booking: &BookingRow) -> Result<(), AppError> {
    match booking.status {
        BookingStatus::Refunded => Err(AppError::bad_request(
            "ALREADY_REFUNDED",
            "This booking has already been refunded",
        )),
        status if status.is_cancelled() => Err(AppError::bad_request(
            "ALREADY_CANCELLED",
            "This booking is already cancelled",
        )),
        status if !rules::can_cancel(status) => Err(AppError::bad_request(
            "BOOKING_NOT_CANCELLABLE",
            format!("A booking with status {status} cannot be cancelled"),
        )),
        _ => Ok(()),
    }
}

fn already_refunded(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::bad_request(
            "ALREADY_REFUNDED",
            "This booking has already been refunded",
        ),
        _ => AppError::Db(e),
    }
}

/// Cancels a booking and refunds the share its timing allows when it was paid online.
///
/// The booking row stays locked from the status check until commit, so a
/// concurrent admin status change or a second cancellation waits and then
/// sees the result of this one.
pub async fn cancel_booking(
    state: &AppState,
    id: Uuid,
    user: &AuthUser,
    acting: Acting,
    reason: Option<String>,
) -> Result<CancellationOutcome, AppError> {
    let mut tx = state.db.begin().await?;
    let booking = bookings::lock_for_update(&mut *tx, id)
        .await?
        .filter(|booking| user.can_access(&booking.user_id))
        .ok_or_else(AppError::booking_not_found)?;
    ensure_cancellable(&booking)?;
    if refunds::get_by_booking(&mut *tx, booking.id).await?.is_some() {
        return Err(AppError::bad_request(
            "ALREADY_REFUNDED",
            "This booking has already been refunded",
        ));
    }

    let quote = refund_quote(state, &booking, Utc::now());
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| acting.default_reason().to_string());

    let refundable_payment = booking
        .stripe_payment_id
        .as_deref()
        .filter(|_| quote.amount_cents > 0);

    let (updated, refund) = match refundable_payment {
        Some(payment_intent) => {
            let gateway = state.payment_gateway()?;
            let stripe_refund = gateway
                .create_refund(payment_intent, quote.amount_cents, booking.id)
                .await?;

            let refund = refunds::create(
                &mut *tx,
                CreateRefund {
                    booking_id: booking.id,
                    amount_cents: quote.amount_cents,
                    percentage: quote.percentage,
                    stripe_refund_id: Some(stripe_refund.id.clone()),
                    reason,
                    status: stripe_refund
                        .status
                        .clone()
                        .unwrap_or_else(|| "succeeded".to_string()),
                },
            )
            .await
            .map_err(already_refunded)?;

            let payment_status = if quote.percentage == 100 {
                PaymentStatus::Refunded
            } else {
                PaymentStatus::PartiallyRefunded
            };
            payments::set_status(&mut *tx, booking.id, payment_status).await?;

            let updated =
                bookings::mark_refunded(&mut *tx, booking.id, booking.status, &stripe_refund.id)
                    .await?
                    .ok_or_else(AppError::status_changed)?;
            (updated, Some(refund))
        }
        None => {
            let updated = bookings::update_status(
                &mut *tx,
                booking.id,
                booking.status,
                acting.cancelled_status(),
            )
            .await?
            .ok_or_else(AppError::status_changed)?;
            (updated, None)
        }
    };
    tx.commit().await?;

    if booking.status == BookingStatus::PendingPayment {
        close_open_checkout(state, &booking).await;
    }

    info!(
        "Booking {} cancelled ({:?}), refund {}% = {} cents",
        updated.id,
        acting,
        quote.percentage,
        refund.as_ref().map_or(0, |r| r.amount_cents)
    );

    let room_name = rooms::get_by_id(&state.db, updated.room_id)
        .await?
        .map(|room| room.name)
        .unwrap_or_default();
    spawn_email(
        state.email_service(),
        EmailType::Cancelled {
            details: BookingDetails::new(&updated, &room_name),
            refund: refund.as_ref().map(|r| RefundNotice {
                amount_cents: r.amount_cents,
                percentage: r.percentage,
            }),
        },
    );

    Ok(CancellationOutcome {
        booking: updated,
        quote,
        refund,
    })
}

/// Best effort: a cancelled booking must not stay payable. A session that
/// cannot be expired because it was already paid needs a manual refund.
async fn close_open_checkout(state: &AppState, booking: &BookingRow) {
    let (Some(session_id), Ok(gateway)) = (&booking.stripe_session_id, state.payment_gateway())
    else {
        return;
    };
    let Err(e) = gateway.expire_session(session_id).await else {
        return;
    };
    match gateway.retrieve_session(session_id).await {
        Ok(session) if session.is_paid() => error!(
            "Checkout session {} of cancelled booking {} was paid; manual refund needed",
            session_id, booking.id
        ),
        _ => warn!(
            "Could not expire checkout session {} of booking {}: {}",
            session_id, booking.id, e
        ),
    }
}

/// Admin status change, limited to the settable statuses and legal transitions.
pub async fn set_status(
    state: &AppState,
    id: Uuid,
    raw_status: &str,
) -> Result<BookingRow, AppError> {
    let target = raw_status
        .parse::<BookingStatus>()
        .ok()
        .filter(|status| rules::is_admin_settable(*status))
        .ok_or_else(|| {
            let allowed: Vec<&str> = rules::ADMIN_SETTABLE_STATUSES
                .iter()
                .map(BookingStatus::as_str)
                .collect();
            AppError::bad_request(
                "INVALID_STATUS",
                format!("Status must be one of: {}", allowed.join(", ")),
            )
        })?;

    let mut tx = state.db.begin().await?;
    let current = bookings::lock_for_update(&mut *tx, id)
        .await?
        .ok_or_else(AppError::booking_not_found)?;

    if !rules::allows_transition(current.status, target) {
        return Err(AppError::bad_request(
            "INVALID_STATUS_TRANSITION",
            format!("Cannot change status from {} to {}", current.status, target),
        ));
    }

    let updated = bookings::update_status(&mut *tx, id, current.status, target)
        .await?
        .ok_or_else(AppError::status_changed)?;
    tx.commit().await?;
    info!("Booking {} status {} -> {}", id, current.status, target);

    if target == BookingStatus::CancelledByAdmin {
        let room_name = rooms::get_by_id(&state.db, updated.room_id)
            .await?
            .map(|room| room.name)
            .unwrap_or_default();
        spawn_email(
            state.email_service(),
            EmailType::Cancelled {
                details: BookingDetails::new(&updated, &room_name),
                refund: None,
            },
        );
    }

    Ok(updated)
}
