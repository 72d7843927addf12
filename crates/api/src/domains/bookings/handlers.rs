use axum::{body::Bytes, extract::State};
use infra::repos::{bookings, rooms, BookingStatus};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domains::bookings::service::{self, Acting};
use crate::domains::bookings::types::{
    Booking, CancelBookingRequest, CancellationResult, CreateBookingRequest, ModifyBookingRequest,
    RefundSummary,
};
use crate::error::AppError;
use crate::extract::{optional_json, ApiJson, ApiPath};
use crate::response::ApiResponse;
use crate::services::email_service::{spawn_email, BookingDetails, EmailType};
use crate::AppState;

/// `POST /api/bookings`: booking without online payment, confirmed immediately.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let (booking, room) =
        service::create_booking(&state, &user, &req, BookingStatus::Confirmed).await?;

    spawn_email(
        state.email_service(),
        EmailType::Confirmed(BookingDetails::new(&booking, &room.name)),
    );

    Ok(ApiResponse::created(Booking::from(booking).with_room(&room))
        .with_message("Booking confirmed"))
}

/// `GET /api/bookings/my-bookings`
pub async fn my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    let rows = bookings::list_by_user(&state.db, &user.id).await?;
    Ok(ApiResponse::list(rows.into_iter().map(Booking::from).collect()))
}

/// `GET /api/bookings/{id}`
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiResponse<Booking>, AppError> {
    let booking = service::load_accessible(&state, id, &user).await?;
    let room = rooms::get_by_id(&state.db, booking.room_id).await?;

    let mut dto = Booking::from(booking);
    if let Some(room) = &room {
        dto = dto.with_room(room);
    }
    Ok(ApiResponse::ok(dto))
}

/// `PATCH /api/bookings/{id}`
pub async fn modify(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ModifyBookingRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let (booking, room) = service::modify_booking(&state, id, &user, Acting::Customer, &req).await?;
    Ok(ApiResponse::ok(Booking::from(booking).with_room(&room)).with_message("Booking updated"))
}

/// `PATCH /api/bookings/{id}/cancel`, with an optional `{ "reason": ... }` body.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<ApiResponse<CancellationResult>, AppError> {
    let req: CancelBookingRequest = optional_json(&body)?;
    let outcome = service::cancel_booking(&state, id, &user, Acting::Customer, req.reason).await?;
    Ok(cancellation_response(outcome))
}

pub(crate) fn cancellation_response(
    outcome: service::CancellationOutcome,
) -> ApiResponse<CancellationResult> {
    let refund = match outcome.refund {
        Some(row) => RefundSummary::from(row),
        None => RefundSummary::none(&outcome.quote),
    };
    let message = if refund.amount_cents > 0 {
        format!("Booking cancelled, {}% refunded", refund.percentage)
    } else {
        "Booking cancelled".to_string()
    };

    ApiResponse::ok(CancellationResult {
        booking: Booking::from(outcome.booking),
        refund,
    })
    .with_message(message)
}
