use chrono::Utc;
use infra::repos::{bookings, payments, refunds, rooms, BookingStatus};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domains::bookings::rules;
use crate::domains::bookings::service as booking_service;
use crate::domains::bookings::types::Booking;
use crate::domains::payments::types::{
    CheckoutResponse, CreateCheckoutRequest, RefundCalculation, VerifyResponse,
};
use crate::error::AppError;
use crate::services::email_service::{spawn_email, BookingDetails, EmailType};
use crate::services::payment_service::NewCheckout;
use crate::AppState;

/// Holds the slot as `pending_payment` and opens a Stripe checkout for it.
/// If Stripe refuses, the slot is released again.
pub async fn create_checkout(
    state: &AppState,
    user: &AuthUser,
    req: &CreateCheckoutRequest,
) -> Result<CheckoutResponse, AppError> {
    let gateway = state.payment_gateway()?;

    let (booking, room) = booking_service::create_booking(
        state,
        user,
        &req.booking_data,
        BookingStatus::PendingPayment,
    )
    .await?;

    if booking.total_price_cents == 0 {
        let confirmed = bookings::confirm_payment(&state.db, booking.id, None)
            .await?
            .ok_or_else(AppError::booking_not_found)?;
        spawn_email(
            state.email_service(),
            EmailType::Confirmed(BookingDetails::new(&confirmed, &room.name)),
        );
        return Ok(CheckoutResponse {
            booking_id: confirmed.id,
            session_id: None,
            session_url: None,
            total_price_cents: 0,
            status: confirmed.status,
            expires_at: None,
        });
    }

    let expires_at = state.config().checkout_expires_at(Utc::now());
    let checkout = NewCheckout {
        booking_id: booking.id,
        product_name: room.name.clone(),
        description: format!(
            "{} {} - {}, {} people",
            booking.date,
            booking.start_time.format("%H:%M"),
            booking.end_time.format("%H:%M"),
            booking.number_of_people
        ),
        amount_cents: booking.total_price_cents,
        customer_email: booking.customer_email.clone(),
        expires_at,
    };

    let session = match gateway.create_checkout_session(&checkout).await {
        Ok(session) => session,
        Err(e) => {
            bookings::update_status(
                &state.db,
                booking.id,
                BookingStatus::PendingPayment,
                BookingStatus::CancelledNoPayment,
            )
            .await?;
            return Err(e.into());
        }
    };

    let mut tx = state.db.begin().await?;
    bookings::set_session_id(&mut *tx, booking.id, &session.id).await?;
    payments::create_pending(
        &mut *tx,
        booking.id,
        &session.id,
        booking.total_price_cents,
        gateway.currency(),
    )
    .await?;
    tx.commit().await?;

    Ok(CheckoutResponse {
        booking_id: booking.id,
        session_id: Some(session.id),
        session_url: session.url,
        total_price_cents: booking.total_price_cents,
        status: booking.status,
        expires_at: Some(expires_at),
    })
}

/// Confirms the booking behind a checkout session once Stripe reports it paid.
/// Calling it again after confirmation changes nothing.
pub async fn verify_session(
    state: &AppState,
    user: &AuthUser,
    session_id: &str,
) -> Result<VerifyResponse, AppError> {
    let gateway = state.payment_gateway()?;

    let booking = bookings::get_by_session_id(&state.db, session_id)
        .await?
        .filter(|booking| user.can_access(&booking.user_id))
        .ok_or_else(AppError::booking_not_found)?;

    let session = gateway.retrieve_session(session_id).await?;

    let booking = if session.is_paid() {
        let mut tx = state.db.begin().await?;
        let confirmed =
            bookings::confirm_payment(&mut *tx, booking.id, session.payment_intent.as_deref())
                .await?;
        if confirmed.is_some() {
            payments::mark_succeeded(&mut *tx, booking.id, session.payment_intent.as_deref())
                .await?;
        }
        tx.commit().await?;

        match confirmed {
            Some(confirmed) => {
                info!("Payment received for booking {}", confirmed.id);
                if let Some(room) = rooms::get_by_id(&state.db, confirmed.room_id).await? {
                    spawn_email(
                        state.email_service(),
                        EmailType::Confirmed(BookingDetails::new(&confirmed, &room.name)),
                    );
                }
                confirmed
            }
            None => {
                let current = bookings::get_by_id(&state.db, booking.id)
                    .await?
                    .ok_or_else(AppError::booking_not_found)?;
                if paid_after_release(current.status) {
                    error!(
                        "Session {} was paid after booking {} became {}; manual refund needed",
                        session_id, current.id, current.status
                    );
                }
                current
            }
        }
    } else {
        booking
    };

    Ok(VerifyResponse {
        paid: session.is_paid(),
        booking: Booking::from(booking),
        payment_status: session.payment_status,
        session_status: session.status,
    })
}

/// Statuses in which a paid checkout has no booking left to pay for.
pub fn paid_after_release(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::CancelledNoPayment
            | BookingStatus::CancelledByUser
            | BookingStatus::CancelledByAdmin
    )
}

pub async fn calculate_refund(
    state: &AppState,
    user: &AuthUser,
    booking_id: Uuid,
) -> Result<RefundCalculation, AppError> {
    let booking = booking_service::load_accessible(state, booking_id, user).await?;
    let quote = booking_service::refund_quote(state, &booking, Utc::now());

    let paid_online = booking.stripe_payment_id.is_some();
    let can_cancel = rules::can_cancel(booking.status);
    let already_refunded = refunds::get_by_booking(&state.db, booking.id).await?.is_some();
    let refund_amount_cents = if paid_online && can_cancel && !already_refunded {
        quote.amount_cents
    } else {
        0
    };

    Ok(RefundCalculation {
        booking_id: booking.id,
        total_price_cents: booking.total_price_cents,
        refund_percentage: quote.percentage,
        refund_amount_cents,
        hours_until_start: quote.hours_until_start,
        paid_online,
        can_cancel,
        can_refund: refund_amount_cents > 0,
    })
}
