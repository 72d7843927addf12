use crate::repos::bookings::BookingStatus;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RoomRow {
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

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    pub original_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub number_of_people: i32,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_id: Option<String>,
    pub stripe_refund_id: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking joined with the display fields of its room.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingWithRoomRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: BookingRow,
    pub room_name: String,
    pub room_image_url: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookedSlotRow {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub amount_cents: i32,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefundRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount_cents: i32,
    pub percentage: i32,
    pub stripe_refund_id: Option<String>,
    pub reason: String,
    pub status: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TopRoomRow {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub bookings: i64,
}
