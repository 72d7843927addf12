use std::cmp::Ordering;

use axum::extract::State;
use chrono::{NaiveDate, Utc};
use infra::models::RoomRow;
use infra::repos::{bookings, rooms};
use uuid::Uuid;

use crate::domains::bookings::rules::{self, TimeRange};
use crate::domains::rooms::types::{AvailabilityQuery, DayAvailability, Room, RoomDetail, TimeSlot};
use crate::error::AppError;
use crate::extract::{ApiPath, ApiQuery};
use crate::response::ApiResponse;
use crate::AppState;

async fn load_active(state: &AppState, id: Uuid) -> Result<RoomRow, AppError> {
    rooms::get_by_id(&state.db, id)
        .await?
        .filter(|room| room.is_active)
        .ok_or_else(AppError::room_not_found)
}

/// `GET /api/rooms`
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Room>>, AppError> {
    let rows = rooms::list_active(&state.db).await?;
    Ok(ApiResponse::list(rows.into_iter().map(Room::from).collect()))
}

/// `GET /api/rooms/{id}`: active room plus its booked slots from today on.
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiResponse<RoomDetail>, AppError> {
    let room = load_active(&state, id).await?;
    let today = state.config().local_today(Utc::now());
    let booked = bookings::booked_slots(&state.db, room.id, today, None).await?;

    Ok(ApiResponse::ok(RoomDetail {
        room: Room::from(room),
        booked_slots: booked.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /api/rooms/{id}/availability?date=YYYY-MM-DD` (defaults to today).
pub async fn availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> Result<ApiResponse<DayAvailability>, AppError> {
    let config = state.config();
    let local_now = config.local_now(Utc::now());

    let date = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::field("date", "Date must use the YYYY-MM-DD format"))?,
        None => local_now.date(),
    };

    let room = load_active(&state, id).await?;
    let booked: Vec<TimeRange> = bookings::booked_slots(&state.db, room.id, date, Some(date))
        .await?
        .into_iter()
        .filter_map(|slot| TimeRange::new(slot.start_time, slot.end_time))
        .collect();

    let cutoff = match date.cmp(&local_now.date()) {
        Ordering::Less => Some(config.closing_time),
        Ordering::Equal => Some(local_now.time()),
        Ordering::Greater => None,
    };

    let slots = rules::day_grid(config.opening_time, config.closing_time, &booked, cutoff)
        .into_iter()
        .map(TimeSlot::from)
        .collect();

    Ok(ApiResponse::ok(DayAvailability {
        room_id: room.id,
        date,
        opening_time: config.opening_time,
        closing_time: config.closing_time,
        slots,
    }))
}
