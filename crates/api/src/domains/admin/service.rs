use chrono::{Datelike, Duration, NaiveDate, Utc};
use infra::models::RoomRow;
use infra::repos::{bookings, rooms, statistics, CreateRoom, UpdateRoom};
use tracing::info;
use uuid::Uuid;

use crate::domains::admin::types::{CreateRoomRequest, Statistics, UpdateRoomRequest};
use crate::error::AppError;
use crate::AppState;

const TOP_ROOMS: i64 = 5;

/// First and last day of the month containing `today`, and of the month before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub current_start: NaiveDate,
    pub current_end: NaiveDate,
    pub previous_start: NaiveDate,
    pub previous_end: NaiveDate,
}

pub fn month_bounds(today: NaiveDate) -> MonthBounds {
    let current_start = today.with_day(1).unwrap_or(today);
    let next_start = if current_start.month() == 12 {
        NaiveDate::from_ymd_opt(current_start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(current_start.year(), current_start.month() + 1, 1)
    }
    .unwrap_or(current_start);
    let previous_end = current_start - Duration::days(1);

    MonthBounds {
        current_start,
        current_end: next_start - Duration::days(1),
        previous_start: previous_end.with_day(1).unwrap_or(previous_end),
        previous_end,
    }
}

/// Growth in percent, rounded to one decimal. Growth from an empty month is 100.
pub fn monthly_growth(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    let growth = (current - previous) as f64 / previous as f64 * 100.0;
    (growth * 10.0).round() / 10.0
}

pub async fn statistics(state: &AppState) -> Result<Statistics, AppError> {
    let bounds = month_bounds(state.config().local_today(Utc::now()));

    let total_rooms = statistics::count_active_rooms(&state.db).await?;
    let total_bookings = statistics::count_bookings(&state.db).await?;
    let monthly_bookings =
        statistics::count_bookings_between(&state.db, bounds.current_start, bounds.current_end)
            .await?;
    let last_month_bookings =
        statistics::count_bookings_between(&state.db, bounds.previous_start, bounds.previous_end)
            .await?;
    let total_revenue_cents = statistics::revenue_cents(&state.db).await?;
    let active_users = statistics::count_distinct_users(&state.db).await?;
    let top_rooms = statistics::top_rooms(&state.db, TOP_ROOMS).await?;

    Ok(Statistics {
        total_rooms,
        total_bookings,
        monthly_bookings,
        last_month_bookings,
        monthly_growth: monthly_growth(monthly_bookings, last_month_bookings),
        total_revenue_cents,
        active_users,
        top_rooms: top_rooms.into_iter().map(Into::into).collect(),
    })
}

fn check_room_fields(
    name: Option<&str>,
    capacity: Option<i32>,
    price_per_hour_cents: Option<i32>,
) -> Result<(), AppError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("INVALID_INPUT", "Room name is required"));
        }
    }
    if capacity.is_some_and(|c| c < 1) {
        return Err(AppError::bad_request(
            "INVALID_CAPACITY",
            "Capacity must be at least 1",
        ));
    }
    if price_per_hour_cents.is_some_and(|p| p < 0) {
        return Err(AppError::bad_request(
            "INVALID_PRICE",
            "Price cannot be negative",
        ));
    }
    Ok(())
}

pub async fn create_room(state: &AppState, req: CreateRoomRequest) -> Result<RoomRow, AppError> {
    check_room_fields(
        Some(&req.name),
        Some(req.capacity),
        Some(req.price_per_hour_cents),
    )?;

    let room = rooms::create(
        &state.db,
        CreateRoom {
            name: req.name.trim().to_string(),
            description: req.description,
            capacity: req.capacity,
            price_per_hour_cents: req.price_per_hour_cents,
            equipments: req.equipments,
            image_url: req.image_url,
            images: req.images,
        },
    )
    .await?;

    info!("Room {} created ({})", room.id, room.name);
    Ok(room)
}

pub async fn update_room(
    state: &AppState,
    id: Uuid,
    req: UpdateRoomRequest,
) -> Result<RoomRow, AppError> {
    check_room_fields(req.name.as_deref(), req.capacity, req.price_per_hour_cents)?;

    rooms::update(
        &state.db,
        id,
        UpdateRoom {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            capacity: req.capacity,
            price_per_hour_cents: req.price_per_hour_cents,
            equipments: req.equipments,
            image_url: req.image_url,
            images: req.images,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(AppError::room_not_found)
}

pub async fn toggle_room(state: &AppState, id: Uuid) -> Result<RoomRow, AppError> {
    let room = rooms::toggle_active(&state.db, id)
        .await?
        .ok_or_else(AppError::room_not_found)?;
    info!(
        "Room {} {}",
        room.id,
        if room.is_active { "activated" } else { "deactivated" }
    );
    Ok(room)
}

fn has_bookings() -> AppError {
    AppError::bad_request(
        "HAS_BOOKINGS",
        "This room has bookings and cannot be deleted",
    )
}

/// Deletes an inactive room that was never booked.
pub async fn delete_room(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let room = rooms::get_by_id(&state.db, id)
        .await?
        .ok_or_else(AppError::room_not_found)?;

    if room.is_active {
        return Err(AppError::bad_request(
            "ROOM_STILL_ACTIVE",
            "Deactivate the room before deleting it",
        ));
    }
    if bookings::count_by_room(&state.db, id).await? > 0 {
        return Err(has_bookings());
    }

    match rooms::delete(&state.db, id).await {
        Ok(true) => {
            info!("Room {} deleted", id);
            Ok(())
        }
        Ok(false) => Err(AppError::room_not_found()),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(has_bookings()),
        Err(e) => Err(e.into()),
    }
}
