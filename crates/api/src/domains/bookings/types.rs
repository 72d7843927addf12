use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use infra::models::{BookingRow, BookingWithRoomRow, RefundRow, RoomRow};
use infra::repos::BookingStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::bookings::rules::{self, RefundQuote};
use crate::domains::common::hhmm;

/// Fields arrive as loose JSON so that each problem can be reported per field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub room_id: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub number_of_people: Option<i32>,
}

/// Partial change of date, time or headcount. Missing fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyBookingRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub number_of_people: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_image_url: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    pub original_date: Option<NaiveDate>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub number_of_people: i32,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    pub can_modify: bool,
    pub can_cancel: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn with_room(mut self, room: &RoomRow) -> Self {
        self.room_name = Some(room.name.clone());
        self.room_image_url = Some(room.image_url.clone());
        self
    }
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            room_name: None,
            room_image_url: None,
            user_id: row.user_id,
            date: row.date,
            original_date: row.original_date,
            start_time: row.start_time,
            end_time: row.end_time,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            number_of_people: row.number_of_people,
            total_price_cents: row.total_price_cents,
            can_modify: rules::customer_can_modify(row.status),
            can_cancel: rules::can_cancel(row.status),
            status: row.status,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<BookingWithRoomRow> for Booking {
    fn from(row: BookingWithRoomRow) -> Self {
        let mut booking = Booking::from(row.booking);
        booking.room_name = Some(row.room_name);
        booking.room_image_url = Some(row.room_image_url);
        booking
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSummary {
    pub percentage: i32,
    pub amount_cents: i32,
    pub refund_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RefundSummary {
    pub fn none(quote: &RefundQuote) -> Self {
        Self {
            percentage: quote.percentage,
            amount_cents: 0,
            refund_id: None,
            processed_at: None,
        }
    }
}

impl From<RefundRow> for RefundSummary {
    fn from(row: RefundRow) -> Self {
        Self {
            percentage: row.percentage,
            amount_cents: row.amount_cents,
            refund_id: row.stripe_refund_id,
            processed_at: row.processed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResult {
    pub booking: Booking,
    pub refund: RefundSummary,
}
