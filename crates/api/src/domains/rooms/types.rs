use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use infra::models::{BookedSlotRow, RoomRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::bookings::rules::GridSlot;
use crate::domains::common::hhmm;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_hour_cents: i32,
    pub equipments: Vec<String>,
    pub image_url: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            capacity: row.capacity,
            price_per_hour_cents: row.price_per_hour_cents,
            equipments: row.equipments,
            image_url: row.image_url,
            images: row.images,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl From<BookedSlotRow> for BookedSlot {
    fn from(row: BookedSlotRow) -> Self {
        Self {
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
        }
    }
}

/// Room with the upcoming slots already taken.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub booked_slots: Vec<BookedSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub available: bool,
    pub booked: bool,
    pub past: bool,
}

impl From<GridSlot> for TimeSlot {
    fn from(slot: GridSlot) -> Self {
        Self {
            start_time: slot.range.start,
            end_time: slot.range.end,
            available: slot.available(),
            booked: slot.booked,
            past: slot.past,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub room_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub opening_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub closing_time: NaiveTime,
    pub slots: Vec<TimeSlot>,
}
