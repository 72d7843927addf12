use axum::{body::Bytes, extract::State};
use infra::pagination::LimitOffset;
use infra::repos::{bookings, rooms, BookingFilter, BookingStatus};
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::domains::admin::service;
use crate::domains::admin::types::{
    AdminBookingsQuery, CreateRoomRequest, Statistics, StatusUpdateRequest, UpdateRoomRequest,
};
use crate::domains::bookings::handlers::cancellation_response;
use crate::domains::bookings::service::{self as booking_service, Acting};
use crate::domains::bookings::types::{
    Booking, CancelBookingRequest, CancellationResult, ModifyBookingRequest,
};
use crate::domains::rooms::types::Room;
use crate::error::AppError;
use crate::extract::{optional_json, ApiJson, ApiPath, ApiQuery};
use crate::response::{ApiResponse, Meta};
use crate::AppState;

/// `GET /api/admin/rooms`: active and inactive rooms.
pub async fn list_rooms(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<ApiResponse<Vec<Room>>, AppError> {
    let rows = rooms::list_all(&state.db).await?;
    Ok(ApiResponse::list(rows.into_iter().map(Room::from).collect()))
}

/// `POST /api/admin/rooms`
pub async fn create_room(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<CreateRoomRequest>,
) -> Result<ApiResponse<Room>, AppError> {
    let room = service::create_room(&state, req).await?;
    Ok(ApiResponse::created(Room::from(room)).with_message("Room created"))
}

/// `PUT /api/admin/rooms/{id}`
pub async fn update_room(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateRoomRequest>,
) -> Result<ApiResponse<Room>, AppError> {
    let room = service::update_room(&state, id, req).await?;
    Ok(ApiResponse::ok(Room::from(room)).with_message("Room updated"))
}

/// `PATCH /api/admin/rooms/{id}/toggle`
pub async fn toggle_room(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiResponse<Room>, AppError> {
    let room = service::toggle_room(&state, id).await?;
    let message = if room.is_active {
        "Room activated"
    } else {
        "Room deactivated"
    };
    Ok(ApiResponse::ok(Room::from(room)).with_message(message))
}

/// `DELETE /api/admin/rooms/{id}`
pub async fn delete_room(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiResponse<Option<()>>, AppError> {
    service::delete_room(&state, id).await?;
    Ok(ApiResponse::ok(None).with_message("Room deleted"))
}

/// `GET /api/admin/bookings?status=&roomId=&startDate=&endDate=&limit=&offset=`
pub async fn list_bookings(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<AdminBookingsQuery>,
) -> Result<ApiResponse<Vec<Booking>>, AppError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        Some(raw) => Some(
            raw.parse::<BookingStatus>()
                .map_err(|e| AppError::bad_request("INVALID_STATUS", e))?,
        ),
        None => None,
    };

    let page = LimitOffset::new(query.limit, query.offset);
    let filter = BookingFilter {
        status,
        room_id: query.room_id,
        from: query.start_date,
        to: query.end_date,
    };
    let total = bookings::count(&state.db, &filter).await?;
    let rows = bookings::list(&state.db, filter, Some(page)).await?;

    let total = usize::try_from(total).unwrap_or_default();
    Ok(
        ApiResponse::ok(rows.into_iter().map(Booking::from).collect()).with_meta(Meta {
            total,
            limit: Some(page.limit),
            offset: Some(page.offset),
        }),
    )
}

/// `PATCH /api/admin/bookings/{id}/status`
pub async fn update_booking_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusUpdateRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let booking = booking_service::set_status(&state, id, &req.status).await?;
    Ok(ApiResponse::ok(Booking::from(booking)).with_message("Booking status updated"))
}

/// `PUT /api/admin/bookings/{id}`
pub async fn modify_booking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ModifyBookingRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let (booking, room) =
        booking_service::modify_booking(&state, id, &admin, Acting::Admin, &req).await?;
    Ok(ApiResponse::ok(Booking::from(booking).with_room(&room)).with_message("Booking updated"))
}

/// `PATCH /api/admin/bookings/{id}/cancel`
pub async fn cancel_booking(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<ApiResponse<CancellationResult>, AppError> {
    let req: CancelBookingRequest = optional_json(&body)?;
    let outcome =
        booking_service::cancel_booking(&state, id, &admin, Acting::Admin, req.reason).await?;
    Ok(cancellation_response(outcome))
}

/// `GET /api/admin/statistics`
pub async fn statistics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<ApiResponse<Statistics>, AppError> {
    Ok(ApiResponse::ok(service::statistics(&state).await?))
}
