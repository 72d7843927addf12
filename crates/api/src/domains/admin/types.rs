use chrono::NaiveDate;
use infra::models::TopRoomRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub capacity: i32,
    pub price_per_hour_cents: i32,
    #[serde(default)]
    pub equipments: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub price_per_hour_cents: Option<i32>,
    pub equipments: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingsQuery {
    pub status: Option<String>,
    pub room_id: Option<Uuid>,
    #[serde(alias = "from")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "to")]
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRoom {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub bookings: i64,
}

impl From<TopRoomRow> for TopRoom {
    fn from(row: TopRoomRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            bookings: row.bookings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_rooms: i64,
    pub total_bookings: i64,
    pub monthly_bookings: i64,
    pub last_month_bookings: i64,
    /// Percent change of `monthly_bookings` over `last_month_bookings`, one decimal.
    pub monthly_growth: f64,
    pub total_revenue_cents: i64,
    /// Distinct users who ever booked.
    pub active_users: i64,
    pub top_rooms: Vec<TopRoom>,
}
